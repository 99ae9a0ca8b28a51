//! Vector containers and the container contract shared by dense and sparse storage.
//!
//! [`ConstVector`] is the read side every operand type implements (dense and
//! sparse vectors, and the zero-copy [`MatrixLine`](crate::MatrixLine)
//! views). [`Vector`] adds the write side needed by destinations and by the
//! matrix backing store.

pub mod dense;
pub mod iter;
pub mod joint;
pub mod sparse;
mod sparse_math;

use crate::error::{check_dim, check_index, check_permutation, Result};
use crate::real::Real;
use crate::scalar::{ConstScalar, Scalar};

pub use dense::DenseVector;
pub use iter::IterMut;
pub use joint::{JointIter, JointIter3, JointIter3Mut, JointIterMut};
pub use sparse::SparseVector;

/// Read access to a vector of scalars.
pub trait ConstVector {
    /// Element kind.
    type Elem: Scalar;

    /// Ascending iterator over `(index, element)` pairs.
    ///
    /// Sparse containers yield occupied entries only; dense containers yield
    /// every position.
    type Iter<'a>: Iterator<Item = (usize, &'a Self::Elem)>
    where
        Self: 'a;

    /// Declared dimension, independent of occupancy.
    fn dim(&self) -> usize;

    /// Element `i`, or a read-only zero for an absent sparse entry.
    ///
    /// # Panics
    ///
    /// Panics if `i >= dim()`.
    fn const_at(&self, i: usize) -> &Self::Elem;

    /// Iteration starting at the first position `>= i`.
    fn const_iter_from(&self, i: usize) -> Self::Iter<'_>;

    #[inline]
    fn const_iter(&self) -> Self::Iter<'_> {
        self.const_iter_from(0)
    }

    /// Bounds-checked [`const_at`](Self::const_at).
    fn try_const_at(&self, i: usize) -> Result<&Self::Elem> {
        check_index(i, self.dim())?;
        Ok(self.const_at(i))
    }

    /// Raw value of element `i`, bypassing derivatives.
    #[inline]
    fn value_at(&self, i: usize) -> f64 {
        self.const_at(i).value()
    }

    /// Values of all `dim()` positions, absent entries as 0.0.
    fn values(&self) -> Vec<f64> {
        let mut values = vec![0.0; self.dim()];
        for (i, s) in self.const_iter() {
            values[i] = s.value();
        }
        values
    }

    /// Number of entries produced by [`const_iter`](Self::const_iter).
    fn nnz(&self) -> usize {
        self.const_iter().count()
    }
}

/// Write access to a vector of scalars.
pub trait Vector: ConstVector + Clone + Sized {
    /// All-zero vector of dimension `n` (no entries for sparse storage).
    fn null(n: usize) -> Self;

    /// Mutable element `i`; sparse storage allocates a zero entry if absent.
    ///
    /// # Panics
    ///
    /// Panics if `i >= dim()`.
    fn at(&mut self, i: usize) -> &mut Self::Elem;

    /// Bounds-checked [`at`](Self::at).
    fn try_at(&mut self, i: usize) -> Result<&mut Self::Elem> {
        check_index(i, self.dim())?;
        Ok(self.at(i))
    }

    /// Set every element to zero.
    fn reset(&mut self);

    /// Set element `i` to zero, releasing its storage where the layout allows.
    fn unset(&mut self, i: usize);

    /// Exchange elements `i` and `j`.
    fn swap(&mut self, i: usize, j: usize);

    /// Element-wise copy of `other`.
    fn set<V: ConstVector>(&mut self, other: &V) -> Result<()>;

    /// Copy of positions `[from, to)` as a vector of dimension `to - from`.
    fn slice(&self, from: usize, to: usize) -> Result<Self>;

    /// Reorder in place so that `new[i] = old[pi[i]]`.
    ///
    /// Fails with `InvalidPermutation` unless `pi` is a bijection of
    /// `[0, dim())`.
    fn permute(&mut self, pi: &[usize]) -> Result<()> {
        check_permutation(pi, self.dim())?;
        let mut done = vec![false; pi.len()];
        for start in 0..pi.len() {
            if done[start] {
                continue;
            }
            let mut j = start;
            while pi[j] != start {
                self.swap(j, pi[j]);
                done[j] = true;
                j = pi[j];
            }
            done[j] = true;
        }
        Ok(())
    }

    /// Move element `k` to position `dest(k)` for every `k`.
    ///
    /// `dest` must be a bijection of `[0, dim())`. Each cycle is rotated
    /// once, starting from its smallest index, so no marker array is needed.
    fn remap<F: Fn(usize) -> usize>(&mut self, dest: F) {
        for start in 0..self.dim() {
            let mut k = dest(start);
            while k > start {
                k = dest(k);
            }
            if k != start {
                continue;
            }
            let mut k = dest(start);
            while k != start {
                self.swap(start, k);
                k = dest(k);
            }
        }
    }
}

/// `r = Σ aᵢ·bᵢ`, propagating derivatives.
pub fn dot<S, A, B>(r: &mut S, a: &A, b: &B) -> Result<()>
where
    S: Scalar,
    A: ConstVector,
    B: ConstVector,
{
    check_dim(a.dim(), b.dim())?;
    let mut acc = S::default();
    let mut next = S::default();
    let mut t = S::default();
    for (_, x, y) in JointIter::new(a, b) {
        // A structural zero annihilates value and derivatives alike.
        if x.is_structural_zero() || y.is_structural_zero() {
            continue;
        }
        t.mul(x, y);
        next.add(&acc, &t);
        std::mem::swap(&mut acc, &mut next);
    }
    *r = acc;
    Ok(())
}

/// Euclidean norm `r = √(Σ aᵢ²)`.
pub fn norm<S: Scalar, A: ConstVector>(r: &mut S, a: &A) -> Result<()> {
    let mut sq = S::default();
    dot(&mut sq, a, a)?;
    r.sqrt(&sq);
    Ok(())
}

/// Whether `a` and `b` agree in dimension and in every value up to `epsilon`.
pub fn equals<A: ConstVector, B: ConstVector>(a: &A, b: &B, epsilon: f64) -> bool {
    a.dim() == b.dim()
        && JointIter::new(a, b).all(|(_, x, y)| (x.value() - y.value()).abs() <= epsilon)
}

/// Declare position `i` of `v` as independent variable `i` of `v.dim()`.
///
/// Values are kept; sparse vectors are fully populated since every variable
/// carries a one-hot gradient.
pub fn declare_variables<V: Vector<Elem = Real>>(v: &mut V, order: usize) {
    let n = v.dim();
    for i in 0..n {
        v.at(i).set_variable(i, n, order);
    }
}

pub(crate) fn check_range(from: usize, to: usize, dim: usize) -> Result<()> {
    if to > dim {
        return Err(crate::Error::IndexOutOfRange { index: to, dim });
    }
    if from > to {
        return Err(crate::Error::IndexOutOfRange { index: from, dim: to });
    }
    Ok(())
}
