//! Whole-matrix arithmetic.
//!
//! Results are computed in full before the destination is touched, so any
//! operand may share storage with the destination (`m.madd_m(&m, &m.t())`).

use std::rc::Rc;

use crate::error::{check_dim, Result};
use crate::matrix::Matrix;
use crate::scalar::{ConstScalar, Scalar};
use crate::vector::{dot, ConstVector, Vector};

type Elem<V> = <V as ConstVector>::Elem;

fn union(mut a: Vec<(usize, usize)>, b: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    a.extend(b);
    a.sort_unstable();
    a.dedup();
    a
}

impl<V: Vector> Matrix<V> {
    fn check_same_dims<W: Vector>(&self, other: &Matrix<W>) -> Result<()> {
        check_dim(self.rows, other.rows)?;
        check_dim(self.cols, other.cols)
    }

    /// Evaluate `f` at `positions`, then replace the contents of this view
    /// with the nonzero results.
    fn assign<F>(&mut self, positions: Vec<(usize, usize)>, mut f: F)
    where
        F: FnMut(&mut Elem<V>, usize, usize),
    {
        let mut updates = Vec::with_capacity(positions.len());
        for (i, j) in positions {
            let mut r = <Elem<V>>::default();
            f(&mut r, i, j);
            if !r.is_structural_zero() {
                updates.push((i, j, r));
            }
        }
        self.reset();
        let mut values = self.values.borrow_mut();
        for (i, j, r) in updates {
            *values.at(self.index(i, j)) = r;
        }
    }

    fn all_positions(&self) -> Vec<(usize, usize)> {
        let cols = self.cols;
        (0..self.rows * cols).map(|k| (k / cols, k % cols)).collect()
    }

    /// Zero every element of this view. Sparse backings drop the entries.
    pub fn reset(&mut self) {
        if self.is_full() {
            self.values.borrow_mut().reset();
            return;
        }
        let positions = self.support();
        let mut values = self.values.borrow_mut();
        for (i, j) in positions {
            values.unset(self.index(i, j));
        }
    }

    /// Element-wise copy of `other`.
    pub fn set<W: Vector>(&mut self, other: &Matrix<W>) -> Result<()> {
        self.check_same_dims(other)?;
        self.assign(other.support(), |r, i, j| r.set(&*other.const_at(i, j)));
        Ok(())
    }

    /// Overwrite with the identity.
    pub fn set_identity(&mut self) -> Result<()> {
        self.check_square()?;
        self.reset();
        for i in 0..self.rows {
            self.at(i, i).set_value(1.0);
        }
        Ok(())
    }

    /// `self = a + b` element-wise.
    pub fn madd_m<A: Vector, B: Vector>(&mut self, a: &Matrix<A>, b: &Matrix<B>) -> Result<()> {
        self.check_same_dims(a)?;
        self.check_same_dims(b)?;
        self.assign(union(a.support(), b.support()), |r, i, j| {
            r.add(&*a.const_at(i, j), &*b.const_at(i, j))
        });
        Ok(())
    }

    /// `self = a - b` element-wise.
    pub fn msub_m<A: Vector, B: Vector>(&mut self, a: &Matrix<A>, b: &Matrix<B>) -> Result<()> {
        self.check_same_dims(a)?;
        self.check_same_dims(b)?;
        self.assign(union(a.support(), b.support()), |r, i, j| {
            r.sub(&*a.const_at(i, j), &*b.const_at(i, j))
        });
        Ok(())
    }

    /// `self = a ∘ b` (Hadamard product).
    pub fn mmul_m<A: Vector, B: Vector>(&mut self, a: &Matrix<A>, b: &Matrix<B>) -> Result<()> {
        self.check_same_dims(a)?;
        self.check_same_dims(b)?;
        self.assign(union(a.support(), b.support()), |r, i, j| {
            r.mul(&*a.const_at(i, j), &*b.const_at(i, j))
        });
        Ok(())
    }

    /// `self = a + s` at every position.
    pub fn madd_s<A: Vector, T: ConstScalar>(&mut self, a: &Matrix<A>, s: &T) -> Result<()> {
        self.check_same_dims(a)?;
        let positions = if s.is_structural_zero() {
            a.support()
        } else {
            self.all_positions()
        };
        self.assign(positions, |r, i, j| r.add(&*a.const_at(i, j), s));
        Ok(())
    }

    /// `self = a - s` at every position.
    pub fn msub_s<A: Vector, T: ConstScalar>(&mut self, a: &Matrix<A>, s: &T) -> Result<()> {
        self.check_same_dims(a)?;
        let positions = if s.is_structural_zero() {
            a.support()
        } else {
            self.all_positions()
        };
        self.assign(positions, |r, i, j| r.sub(&*a.const_at(i, j), s));
        Ok(())
    }

    /// `self = a * s`.
    pub fn mmul_s<A: Vector, T: ConstScalar>(&mut self, a: &Matrix<A>, s: &T) -> Result<()> {
        self.check_same_dims(a)?;
        self.assign(a.support(), |r, i, j| r.mul(&*a.const_at(i, j), s));
        Ok(())
    }

    /// `self = a / s`.
    pub fn mdiv_s<A: Vector, T: ConstScalar>(&mut self, a: &Matrix<A>, s: &T) -> Result<()> {
        self.check_same_dims(a)?;
        self.assign(a.support(), |r, i, j| r.div(&*a.const_at(i, j), s));
        Ok(())
    }

    /// Matrix product `self = a · b`.
    ///
    /// Each result row is accumulated in `tmp2` before it is written. When
    /// `self` shares storage with an operand the product is formed in a
    /// fresh matrix and copied in afterwards.
    pub fn mdot_m<A: Vector, B: Vector>(&mut self, a: &Matrix<A>, b: &Matrix<B>) -> Result<()> {
        check_dim(a.cols, b.rows)?;
        check_dim(self.rows, a.rows)?;
        check_dim(self.cols, b.cols)?;
        if self.shares_storage(a) || self.shares_storage(b) {
            let mut r = Matrix::<V>::null(self.rows, self.cols);
            r.mdot_m(a, b)?;
            return self.set(&r);
        }
        self.init_tmp();
        let tmp2 = Rc::clone(&self.tmp2);
        let mut buffer = tmp2.borrow_mut();
        for i in 0..self.rows {
            let row = a.row_view(i);
            for j in 0..self.cols {
                let mut t = <Elem<V>>::default();
                dot(&mut t, &row, &b.col_view(j))?;
                *buffer.at(j) = t;
            }
            drop(row);
            let mut values = self.values.borrow_mut();
            for j in 0..self.cols {
                let k = self.index(i, j);
                let t = buffer.at(j);
                if t.is_structural_zero() {
                    values.unset(k);
                } else {
                    std::mem::swap(values.at(k), t);
                }
                buffer.unset(j);
            }
        }
        Ok(())
    }

    /// Outer product `self = a · bᵀ`.
    pub fn outer<A: ConstVector, B: ConstVector>(&mut self, a: &A, b: &B) -> Result<()> {
        check_dim(self.rows, a.dim())?;
        check_dim(self.cols, b.dim())?;
        let mut positions = Vec::new();
        for (i, _) in a.const_iter() {
            for (j, _) in b.const_iter() {
                positions.push((i, j));
            }
        }
        self.assign(positions, |r, i, j| r.mul(a.const_at(i), b.const_at(j)));
        Ok(())
    }

    /// Apply `f` to every stored element of this view.
    pub fn map<F: FnMut(&mut Elem<V>)>(&mut self, mut f: F) {
        let positions = self.support();
        let mut values = self.values.borrow_mut();
        for (i, j) in positions {
            let k = self.index(i, j);
            let s = values.at(k);
            f(s);
            if s.is_structural_zero() {
                values.unset(k);
            }
        }
    }

    /// `r = Σ aᵢᵢ`.
    pub fn trace<S: Scalar>(&self, r: &mut S) -> Result<()> {
        self.check_square()?;
        let values = self.values.borrow();
        let mut acc = S::default();
        let mut next = S::default();
        for i in 0..self.rows {
            next.add(&acc, values.const_at(self.index(i, i)));
            std::mem::swap(&mut acc, &mut next);
        }
        *r = acc;
        Ok(())
    }

    /// Frobenius norm `r = √(Σ aᵢⱼ²)`.
    pub fn norm<S: Scalar>(&self, r: &mut S) {
        let values = self.values.borrow();
        let mut acc = S::default();
        let mut next = S::default();
        let mut t = S::default();
        for (i, j) in self.support() {
            let s = values.const_at(self.index(i, j));
            t.mul(s, s);
            next.add(&acc, &t);
            std::mem::swap(&mut acc, &mut next);
        }
        r.sqrt(&acc);
    }

    /// Whether the matrix is square and `|aᵢⱼ - aⱼᵢ| <= epsilon` everywhere.
    pub fn is_symmetric(&self, epsilon: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        self.support()
            .into_iter()
            .all(|(i, j)| (self.value_at(i, j) - self.value_at(j, i)).abs() <= epsilon)
    }

    /// Whether both matrices have the same shape and values within `epsilon`.
    pub fn equals<W: Vector>(&self, other: &Matrix<W>, epsilon: f64) -> bool {
        self.dims() == other.dims()
            && union(self.support(), other.support())
                .into_iter()
                .all(|(i, j)| (self.value_at(i, j) - other.value_at(i, j)).abs() <= epsilon)
    }
}
