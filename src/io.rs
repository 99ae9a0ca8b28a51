//! Plain-text table format with transparent gzip.
//!
//! Vectors occupy one line, matrices one line per row:
//!
//! - dense: whitespace-separated values;
//! - sparse: whitespace-separated `index:value` tokens in ascending index
//!   order. The last position (`dim-1` for vectors, `cols-1` for each matrix
//!   row) is always written, as `index:0` if absent, so that the dimension
//!   survives a round trip.
//!
//! Only values are written; derivative information is not part of the
//! format. Files starting with the gzip magic bytes `1f 8b` are decompressed
//! on import.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{Error, Result};
use crate::matrix::{DenseMatrix, Matrix, SparseMatrix};
use crate::scalar::{ConstScalar, Scalar};
use crate::vector::{ConstVector, DenseVector, SparseVector};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Options for writing tables and JSON files.
#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    /// Gzip-compress the output.
    pub compress: bool,
}

impl ExportOptions {
    /// Options with gzip compression enabled.
    pub fn compressed() -> Self {
        ExportOptions { compress: true }
    }
}

/// Open `path` for reading, detecting gzip by its magic bytes.
pub(crate) fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let mut file = BufReader::new(File::open(path)?);
    let gzip = file.fill_buf()?.starts_with(&GZIP_MAGIC);
    log::debug!("reading {} (gzip: {gzip})", path.display());
    if gzip {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(file))
    }
}

/// Write through `f`, gzip-wrapped if requested.
pub(crate) fn write_file<F>(path: &Path, options: &ExportOptions, f: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    log::debug!("writing {} (gzip: {})", path.display(), options.compress);
    let mut file = BufWriter::new(File::create(path)?);
    if options.compress {
        let mut encoder = GzEncoder::new(file, Compression::default());
        f(&mut encoder)?;
        encoder.finish()?.flush()?;
    } else {
        f(&mut file)?;
        file.flush()?;
    }
    Ok(())
}

fn format_error(line: usize, message: impl Into<String>) -> Error {
    Error::Format {
        line,
        message: message.into(),
    }
}

/// Text table (de)serialization.
pub trait Table: Sized {
    /// The value a failed import leaves behind.
    fn empty() -> Self;

    fn write_table(&self, w: &mut dyn Write) -> Result<()>;

    fn read_table(r: &mut dyn BufRead) -> Result<Self>;

    /// Render as a table string.
    fn to_table_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_table(&mut buf)?;
        String::from_utf8(buf).map_err(|e| format_error(0, e.to_string()))
    }

    /// Parse from a table string.
    fn from_table_str(s: &str) -> Result<Self> {
        Self::read_table(&mut s.as_bytes())
    }

    /// Write to `path`.
    fn export_table<P: AsRef<Path>>(&self, path: P, options: &ExportOptions) -> Result<()> {
        write_file(path.as_ref(), options, |w| self.write_table(w))
    }

    /// Replace `self` with the table stored at `path`.
    ///
    /// On failure `self` is reset to an empty value.
    fn import_table<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let result = open_reader(path.as_ref()).and_then(|mut r| Self::read_table(&mut *r));
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

// ──────────────────────────────────────────────
//  Line codecs
// ──────────────────────────────────────────────

fn write_dense_line<'a, S, I>(w: &mut dyn Write, values: I) -> Result<()>
where
    S: ConstScalar + 'a,
    I: Iterator<Item = &'a S>,
{
    for (k, s) in values.enumerate() {
        if k > 0 {
            write!(w, " ")?;
        }
        write!(w, "{}", s.value())?;
    }
    writeln!(w)?;
    Ok(())
}

fn write_sparse_line<'a, S, I>(w: &mut dyn Write, entries: I, n: usize) -> Result<()>
where
    S: ConstScalar + 'a,
    I: Iterator<Item = (usize, &'a S)>,
{
    let mut first = true;
    let mut has_last = false;
    for (i, s) in entries {
        let x = s.value();
        if x == 0.0 {
            continue;
        }
        if !first {
            write!(w, " ")?;
        }
        write!(w, "{i}:{x}")?;
        first = false;
        has_last |= i + 1 == n;
    }
    if n > 0 && !has_last {
        if !first {
            write!(w, " ")?;
        }
        write!(w, "{}:0", n - 1)?;
    }
    writeln!(w)?;
    Ok(())
}

fn parse_value(token: &str, line: usize) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|e| format_error(line, format!("invalid value `{token}`: {e}")))
}

fn parse_dense_line(text: &str, line: usize) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|t| parse_value(t, line))
        .collect()
}

/// Parsed `index:value` tokens plus the dimension implied by the largest index.
struct SparseLine {
    indices: Vec<usize>,
    values: Vec<f64>,
    dim: usize,
}

fn parse_sparse_line(text: &str, line: usize) -> Result<SparseLine> {
    let mut parsed = SparseLine {
        indices: Vec::new(),
        values: Vec::new(),
        dim: 0,
    };
    for token in text.split_whitespace() {
        let (i, x) = token
            .split_once(':')
            .ok_or_else(|| format_error(line, format!("expected `index:value`, got `{token}`")))?;
        let i = i
            .parse::<usize>()
            .map_err(|e| format_error(line, format!("invalid index `{i}`: {e}")))?;
        let x = parse_value(x, line)?;
        let end = i
            .checked_add(1)
            .ok_or_else(|| format_error(line, format!("index `{i}` is too large")))?;
        parsed.dim = parsed.dim.max(end);
        if x != 0.0 {
            parsed.indices.push(i);
            parsed.values.push(x);
        }
    }
    Ok(parsed)
}

/// Non-blank lines with their 1-based line numbers.
fn content_lines(r: &mut dyn BufRead) -> Result<Vec<(usize, String)>> {
    let mut lines = Vec::new();
    for (k, line) in r.lines().enumerate() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push((k + 1, line));
        }
    }
    Ok(lines)
}

fn single_line(r: &mut dyn BufRead) -> Result<Option<(usize, String)>> {
    let mut lines = content_lines(r)?.into_iter();
    let first = lines.next();
    if let Some((line, _)) = lines.next() {
        return Err(format_error(line, "vector table must be a single line"));
    }
    Ok(first)
}

// ──────────────────────────────────────────────
//  Implementations
// ──────────────────────────────────────────────

impl<S: Scalar> Table for DenseVector<S> {
    fn empty() -> Self {
        DenseVector::null(0)
    }

    fn write_table(&self, w: &mut dyn Write) -> Result<()> {
        write_dense_line(w, self.iter())
    }

    fn read_table(r: &mut dyn BufRead) -> Result<Self> {
        match single_line(r)? {
            Some((line, text)) => Ok(DenseVector::from_values(&parse_dense_line(&text, line)?)),
            None => Ok(Self::empty()),
        }
    }
}

impl<S: Scalar> Table for SparseVector<S> {
    fn empty() -> Self {
        SparseVector::nil(0)
    }

    fn write_table(&self, w: &mut dyn Write) -> Result<()> {
        write_sparse_line(w, self.const_iter(), self.dim())
    }

    fn read_table(r: &mut dyn BufRead) -> Result<Self> {
        match single_line(r)? {
            Some((line, text)) => {
                let parsed = parse_sparse_line(&text, line)?;
                SparseVector::from_triplets(&parsed.indices, &parsed.values, parsed.dim)
            }
            None => Ok(Self::empty()),
        }
    }
}

impl<S: Scalar> Table for DenseMatrix<S> {
    fn empty() -> Self {
        Matrix::null(0, 0)
    }

    fn write_table(&self, w: &mut dyn Write) -> Result<()> {
        for i in 0..self.rows() {
            let row = self.row_view(i);
            let values = (0..row.dim()).map(|j| row.const_at(j));
            write_dense_line(w, values)?;
        }
        Ok(())
    }

    fn read_table(r: &mut dyn BufRead) -> Result<Self> {
        let lines = content_lines(r)?;
        let mut values = Vec::new();
        let mut cols = None;
        for (line, text) in &lines {
            let row = parse_dense_line(text, *line)?;
            match cols {
                None => cols = Some(row.len()),
                Some(c) if c != row.len() => {
                    return Err(format_error(
                        *line,
                        format!("row has {} values, expected {c}", row.len()),
                    ));
                }
                Some(_) => {}
            }
            values.extend(row);
        }
        Matrix::from_values(lines.len(), cols.unwrap_or(0), &values)
    }
}

impl<S: Scalar> Table for SparseMatrix<S> {
    fn empty() -> Self {
        Matrix::nil(0, 0)
    }

    fn write_table(&self, w: &mut dyn Write) -> Result<()> {
        for i in 0..self.rows() {
            write_sparse_line(w, self.row_view(i).const_iter(), self.cols())?;
        }
        Ok(())
    }

    fn read_table(r: &mut dyn BufRead) -> Result<Self> {
        let lines = content_lines(r)?;
        let (mut row_idx, mut col_idx, mut values) = (Vec::new(), Vec::new(), Vec::new());
        let mut cols = 0;
        for (i, (line, text)) in lines.iter().enumerate() {
            let parsed = parse_sparse_line(text, *line)?;
            cols = cols.max(parsed.dim);
            row_idx.extend(std::iter::repeat(i).take(parsed.indices.len()));
            col_idx.extend(parsed.indices);
            values.extend(parsed.values);
        }
        Matrix::from_triplets(lines.len(), cols, &row_idx, &col_idx, &values)
    }
}

/// Read the raw bytes of `path`, decompressing gzip input.
pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    open_reader(path.as_ref())?.read_to_end(&mut buf)?;
    Ok(buf)
}
