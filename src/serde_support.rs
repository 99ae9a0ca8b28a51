//! JSON representation of vectors and matrices.
//!
//! Vectors serialize as `{"Index": [...], "Value": [...], "Length": n}` and
//! matrices as `{"Index": [...], "Value": [...], "Rows": r, "Cols": c}` with
//! row-major indices. Only values are stored; derivatives are dropped.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{element_count, Result};
use crate::io::{open_reader, write_file, ExportOptions, Table};
use crate::matrix::Matrix;
use crate::scalar::{ConstScalar, Scalar};
use crate::vector::{ConstVector, DenseVector, SparseVector, Vector};

#[derive(Deserialize)]
struct VectorData {
    #[serde(rename = "Index", default)]
    index: Vec<usize>,
    #[serde(rename = "Value")]
    value: Vec<f64>,
    #[serde(rename = "Length")]
    length: usize,
}

#[derive(Deserialize)]
struct MatrixData {
    #[serde(rename = "Index", default)]
    index: Vec<usize>,
    #[serde(rename = "Value")]
    value: Vec<f64>,
    #[serde(rename = "Rows")]
    rows: usize,
    #[serde(rename = "Cols")]
    cols: usize,
}

/// Nonzero entries of `v` as parallel index and value lists.
fn nonzeros<V: ConstVector>(v: &V) -> (Vec<usize>, Vec<f64>) {
    v.const_iter()
        .filter(|(_, s)| s.value() != 0.0)
        .map(|(i, s)| (i, s.value()))
        .unzip()
}

fn serialize_vector<V: ConstVector, Ser: Serializer>(
    name: &'static str,
    v: &V,
    serializer: Ser,
) -> std::result::Result<Ser::Ok, Ser::Error> {
    let (index, value) = nonzeros(v);
    let mut s = serializer.serialize_struct(name, 3)?;
    s.serialize_field("Index", &index)?;
    s.serialize_field("Value", &value)?;
    s.serialize_field("Length", &v.dim())?;
    s.end()
}

/// Rebuild a vector; an empty `Index` means `Value` lists every position.
fn build_vector<V: Vector>(data: VectorData) -> Result<V> {
    let index = if data.index.is_empty() && data.value.len() == data.length {
        (0..data.length).collect()
    } else {
        data.index
    };
    crate::error::check_dim(index.len(), data.value.len())?;
    let mut v = V::null(data.length);
    for (i, x) in index.into_iter().zip(data.value) {
        if x != 0.0 {
            v.try_at(i)?.set_value(x);
        }
    }
    Ok(v)
}

impl<S: Scalar> Serialize for SparseVector<S> {
    fn serialize<Ser: Serializer>(
        &self,
        serializer: Ser,
    ) -> std::result::Result<Ser::Ok, Ser::Error> {
        serialize_vector("SparseVector", self, serializer)
    }
}

impl<'de, S: Scalar> Deserialize<'de> for SparseVector<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let data = VectorData::deserialize(deserializer)?;
        build_vector(data).map_err(serde::de::Error::custom)
    }
}

impl<S: Scalar> Serialize for DenseVector<S> {
    fn serialize<Ser: Serializer>(
        &self,
        serializer: Ser,
    ) -> std::result::Result<Ser::Ok, Ser::Error> {
        serialize_vector("DenseVector", self, serializer)
    }
}

impl<'de, S: Scalar> Deserialize<'de> for DenseVector<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let data = VectorData::deserialize(deserializer)?;
        build_vector(data).map_err(serde::de::Error::custom)
    }
}

impl<V: Vector> Serialize for Matrix<V> {
    fn serialize<Ser: Serializer>(
        &self,
        serializer: Ser,
    ) -> std::result::Result<Ser::Ok, Ser::Error> {
        let mut entries: Vec<(usize, f64)> = self
            .support()
            .into_iter()
            .map(|(i, j)| (i * self.cols() + j, self.value_at(i, j)))
            .filter(|&(_, x)| x != 0.0)
            .collect();
        entries.sort_unstable_by_key(|&(k, _)| k);
        let (index, value): (Vec<usize>, Vec<f64>) = entries.into_iter().unzip();
        let mut s = serializer.serialize_struct("Matrix", 4)?;
        s.serialize_field("Index", &index)?;
        s.serialize_field("Value", &value)?;
        s.serialize_field("Rows", &self.rows())?;
        s.serialize_field("Cols", &self.cols())?;
        s.end()
    }
}

impl<'de, V: Vector> Deserialize<'de> for Matrix<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let data = MatrixData::deserialize(deserializer)?;
        let length = element_count(data.rows, data.cols).map_err(serde::de::Error::custom)?;
        let values = build_vector::<V>(VectorData {
            index: data.index,
            value: data.value,
            length,
        })
        .map_err(serde::de::Error::custom)?;
        Matrix::from_vector(data.rows, data.cols, values).map_err(serde::de::Error::custom)
    }
}

/// JSON files, gzip-compressed on request and detected on import.
pub trait JsonFile: Serialize + DeserializeOwned + Table {
    /// Write to `path` as JSON.
    fn export_json<P: AsRef<Path>>(&self, path: P, options: &ExportOptions) -> Result<()> {
        write_file(path.as_ref(), options, |w| {
            serde_json::to_writer(w, self)?;
            Ok(())
        })
    }

    /// Replace `self` with the JSON value stored at `path`.
    ///
    /// On failure `self` is reset to an empty value.
    fn import_json<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let result = open_reader(path.as_ref())
            .and_then(|r| serde_json::from_reader::<_, Self>(r).map_err(Into::into));
        match result {
            Ok(v) => {
                *self = v;
                Ok(())
            }
            Err(e) => {
                *self = Self::empty();
                Err(e)
            }
        }
    }
}

impl<T: Serialize + DeserializeOwned + Table> JsonFile for T {}
