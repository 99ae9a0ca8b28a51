use std::ops::{Index, IndexMut};

use crate::error::{check_dim, Error, Result};
use crate::matrix::Matrix;
use crate::scalar::{ConstScalar, Scalar};
use crate::vector::{check_range, dot, ConstVector, Vector};

/// Dense vector: every position is stored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DenseVector<S: Scalar> {
    values: Vec<S>,
}

impl<S: Scalar> DenseVector<S> {
    /// Zero vector of dimension `n`.
    pub fn null(n: usize) -> Self {
        DenseVector {
            values: vec![S::default(); n],
        }
    }

    /// Constants lifted from plain values.
    pub fn from_values(values: &[f64]) -> Self {
        DenseVector {
            values: values.iter().map(|&v| S::from_value(v)).collect(),
        }
    }

    pub fn from_vec(values: Vec<S>) -> Self {
        DenseVector { values }
    }

    pub fn into_vec(self) -> Vec<S> {
        self.values
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[S] {
        &self.values
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [S] {
        &mut self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.values.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, S> {
        self.values.iter_mut()
    }

    /// Sort elements by value, ascending or (with `reverse`) descending.
    pub fn sort(&mut self, reverse: bool) {
        if reverse {
            self.values.sort_by(|a, b| b.value().total_cmp(&a.value()));
        } else {
            self.values.sort_by(|a, b| a.value().total_cmp(&b.value()));
        }
    }

    /// Apply `f` to every element in place.
    pub fn map<F: FnMut(&mut S)>(&mut self, f: F) {
        self.values.iter_mut().for_each(f);
    }

    fn zip2<A, B, F>(&mut self, a: &A, b: &B, mut f: F) -> Result<()>
    where
        A: ConstVector,
        B: ConstVector,
        F: FnMut(&mut S, &A::Elem, &B::Elem),
    {
        check_dim(self.dim(), a.dim())?;
        check_dim(self.dim(), b.dim())?;
        for (i, r) in self.values.iter_mut().enumerate() {
            f(r, a.const_at(i), b.const_at(i));
        }
        Ok(())
    }

    fn zip1<A, F>(&mut self, a: &A, mut f: F) -> Result<()>
    where
        A: ConstVector,
        F: FnMut(&mut S, &A::Elem),
    {
        check_dim(self.dim(), a.dim())?;
        for (i, r) in self.values.iter_mut().enumerate() {
            f(r, a.const_at(i));
        }
        Ok(())
    }

    /// `self = a + b` element-wise.
    pub fn vadd_v<A: ConstVector, B: ConstVector>(&mut self, a: &A, b: &B) -> Result<()> {
        self.zip2(a, b, |r, x, y| r.add(x, y))
    }

    /// `self = a - b` element-wise.
    pub fn vsub_v<A: ConstVector, B: ConstVector>(&mut self, a: &A, b: &B) -> Result<()> {
        self.zip2(a, b, |r, x, y| r.sub(x, y))
    }

    /// `self = a * b` element-wise.
    pub fn vmul_v<A: ConstVector, B: ConstVector>(&mut self, a: &A, b: &B) -> Result<()> {
        self.zip2(a, b, |r, x, y| r.mul(x, y))
    }

    /// `self = a / b` element-wise.
    pub fn vdiv_v<A: ConstVector, B: ConstVector>(&mut self, a: &A, b: &B) -> Result<()> {
        self.zip2(a, b, |r, x, y| r.div(x, y))
    }

    pub fn vadd_s<A: ConstVector, T: ConstScalar>(&mut self, a: &A, s: &T) -> Result<()> {
        self.zip1(a, |r, x| r.add(x, s))
    }

    pub fn vsub_s<A: ConstVector, T: ConstScalar>(&mut self, a: &A, s: &T) -> Result<()> {
        self.zip1(a, |r, x| r.sub(x, s))
    }

    pub fn vmul_s<A: ConstVector, T: ConstScalar>(&mut self, a: &A, s: &T) -> Result<()> {
        self.zip1(a, |r, x| r.mul(x, s))
    }

    pub fn vdiv_s<A: ConstVector, T: ConstScalar>(&mut self, a: &A, s: &T) -> Result<()> {
        self.zip1(a, |r, x| r.div(x, s))
    }

    /// `self = m · v`.
    pub fn mdot_v<W: Vector, V: ConstVector>(&mut self, m: &Matrix<W>, v: &V) -> Result<()> {
        check_dim(m.rows(), self.dim())?;
        check_dim(m.cols(), v.dim())?;
        for (i, r) in self.values.iter_mut().enumerate() {
            dot(r, &m.row_view(i), v)?;
        }
        Ok(())
    }

    /// `self = vᵀ · m`.
    pub fn vdot_m<V: ConstVector, W: Vector>(&mut self, v: &V, m: &Matrix<W>) -> Result<()> {
        check_dim(m.cols(), self.dim())?;
        check_dim(m.rows(), v.dim())?;
        for (j, r) in self.values.iter_mut().enumerate() {
            dot(r, v, &m.col_view(j))?;
        }
        Ok(())
    }
}

impl<S: Scalar> From<Vec<S>> for DenseVector<S> {
    fn from(values: Vec<S>) -> Self {
        DenseVector { values }
    }
}

impl<S: Scalar> Index<usize> for DenseVector<S> {
    type Output = S;

    #[inline]
    fn index(&self, i: usize) -> &S {
        self.const_at(i)
    }
}

impl<S: Scalar> IndexMut<usize> for DenseVector<S> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut S {
        self.at(i)
    }
}

/// Iterator over every position of a [`DenseVector`].
pub struct DenseIter<'a, S> {
    values: &'a [S],
    pos: usize,
}

impl<'a, S> Iterator for DenseIter<'a, S> {
    type Item = (usize, &'a S);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let s = self.values.get(self.pos)?;
        let i = self.pos;
        self.pos += 1;
        Some((i, s))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.values.len().saturating_sub(self.pos);
        (n, Some(n))
    }
}

impl<S: Scalar> ConstVector for DenseVector<S> {
    type Elem = S;
    type Iter<'a> = DenseIter<'a, S>;

    #[inline]
    fn dim(&self) -> usize {
        self.values.len()
    }

    #[inline]
    fn const_at(&self, i: usize) -> &S {
        match self.values.get(i) {
            Some(s) => s,
            None => panic!("{}", Error::IndexOutOfRange { index: i, dim: self.dim() }),
        }
    }

    fn const_iter_from(&self, i: usize) -> DenseIter<'_, S> {
        DenseIter {
            values: &self.values,
            pos: i,
        }
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }
}

impl<S: Scalar> Vector for DenseVector<S> {
    fn null(n: usize) -> Self {
        DenseVector::null(n)
    }

    #[inline]
    fn at(&mut self, i: usize) -> &mut S {
        let dim = self.values.len();
        match self.values.get_mut(i) {
            Some(s) => s,
            None => panic!("{}", Error::IndexOutOfRange { index: i, dim }),
        }
    }

    fn reset(&mut self) {
        self.values.iter_mut().for_each(Scalar::reset);
    }

    fn unset(&mut self, i: usize) {
        self.at(i).reset();
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.values.swap(i, j);
    }

    fn set<V: ConstVector>(&mut self, other: &V) -> Result<()> {
        self.zip1(other, |r, x| r.set(x))
    }

    fn slice(&self, from: usize, to: usize) -> Result<Self> {
        check_range(from, to, self.dim())?;
        Ok(DenseVector {
            values: self.values[from..to].to_vec(),
        })
    }
}
