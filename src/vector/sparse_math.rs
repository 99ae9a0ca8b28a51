//! Element-wise arithmetic and matrix products writing into a [`SparseVector`].
//!
//! Every kernel runs a joint cursor over the destination and its operands,
//! so results that come out as structural zeros are pruned in the same pass.

use crate::error::{check_dim, Result};
use crate::matrix::Matrix;
use crate::scalar::{ConstScalar, Scalar};
use crate::vector::{dot, ConstVector, SparseVector, Vector};

impl<S: Scalar> SparseVector<S> {
    fn zip2<A, B, F>(&mut self, a: &A, b: &B, mut f: F) -> Result<()>
    where
        A: ConstVector,
        B: ConstVector,
        F: FnMut(&mut S, &A::Elem, &B::Elem),
    {
        check_dim(self.dim(), a.dim())?;
        check_dim(self.dim(), b.dim())?;
        let mut it = self.joint3_iter_mut(a, b);
        while it.ok() {
            let (r, x, y) = it.at();
            f(r, x, y);
            it.next();
        }
        Ok(())
    }

    fn zip1<A, F>(&mut self, a: &A, mut f: F) -> Result<()>
    where
        A: ConstVector,
        F: FnMut(&mut S, &A::Elem),
    {
        check_dim(self.dim(), a.dim())?;
        let mut it = self.joint_iter_mut(a);
        while it.ok() {
            let (r, x) = it.at();
            f(r, x);
            it.next();
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

    /// `self = a + s` at every position; a nonzero `s` fills the vector.
    pub fn vadd_s<A: ConstVector, T: ConstScalar>(&mut self, a: &A, s: &T) -> Result<()> {
        if s.is_structural_zero() {
            return self.set(a);
        }
        check_dim(self.dim(), a.dim())?;
        for i in 0..self.dim() {
            self.at(i).add(a.const_at(i), s);
        }
        Ok(())
    }

    /// `self = a - s` at every position; a nonzero `s` fills the vector.
    pub fn vsub_s<A: ConstVector, T: ConstScalar>(&mut self, a: &A, s: &T) -> Result<()> {
        if s.is_structural_zero() {
            return self.set(a);
        }
        check_dim(self.dim(), a.dim())?;
        for i in 0..self.dim() {
            self.at(i).sub(a.const_at(i), s);
        }
        Ok(())
    }

    /// `self = a * s` over the entries of `a`.
    pub fn vmul_s<A: ConstVector, T: ConstScalar>(&mut self, a: &A, s: &T) -> Result<()> {
        self.zip1(a, |r, x| r.mul(x, s))
    }

    /// `self = a / s` over the entries of `a`.
    pub fn vdiv_s<A: ConstVector, T: ConstScalar>(&mut self, a: &A, s: &T) -> Result<()> {
        self.zip1(a, |r, x| r.div(x, s))
    }

    /// Apply `f` to every stored entry, pruning those that become zero.
    pub fn map<F: FnMut(&mut S)>(&mut self, mut f: F) {
        let mut it = self.iter_mut();
        while it.ok() {
            f(it.get_mut());
            it.next();
        }
    }

    /// `self = m · v`.
    pub fn mdot_v<W: Vector, V: ConstVector>(&mut self, m: &Matrix<W>, v: &V) -> Result<()> {
        check_dim(m.rows(), self.dim())?;
        check_dim(m.cols(), v.dim())?;
        let mut t = S::default();
        for i in 0..self.dim() {
            dot(&mut t, &m.row_view(i), v)?;
            self.store(i, &mut t);
        }
        Ok(())
    }

    /// `self = vᵀ · m`.
    pub fn vdot_m<V: ConstVector, W: Vector>(&mut self, v: &V, m: &Matrix<W>) -> Result<()> {
        check_dim(m.cols(), self.dim())?;
        check_dim(m.rows(), v.dim())?;
        let mut t = S::default();
        for j in 0..self.dim() {
            dot(&mut t, v, &m.col_view(j))?;
            self.store(j, &mut t);
        }
        Ok(())
    }

    fn store(&mut self, i: usize, t: &mut S) {
        if t.is_structural_zero() {
            self.unset(i);
        } else {
            std::mem::swap(self.at(i), t);
        }
    }
}
