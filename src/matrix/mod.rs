//! Matrices as a row/column-major header over a shared backing vector.
//!
//! A [`Matrix`] never owns its elements directly: it holds a reference-counted
//! handle to a flat backing [`Vector`] and maps logical `(i, j)` positions to
//! backing indices through offsets, strides and a `transposed` flag.
//! [`t`](Matrix::t) and [`slice`](Matrix::slice) are O(1) and return headers
//! that share the backing, so writes through a view are visible in every
//! other view of the same storage. [`Clone`] is the way to detach.
//!
//! ```
//! use spardiff::SparseMatrix;
//!
//! let m = SparseMatrix::<f64>::from_triplets(2, 2, &[0, 1], &[1, 0], &[5.0, 7.0]).unwrap();
//! assert_eq!(m.t().value_at(1, 0), 5.0);
//! assert!(!m.is_symmetric(1e-12));
//! ```

mod line;
mod math;

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::error::{check_dim, check_index, check_permutation, element_count, Error, Result};
use crate::scalar::{ConstScalar, Scalar};
use crate::vector::{ConstVector, DenseVector, SparseVector, Vector};

pub use line::{LineIter, MatrixLine};

/// Matrix backed by a dense vector.
pub type DenseMatrix<S> = Matrix<DenseVector<S>>;

/// Matrix backed by a sparse vector.
pub type SparseMatrix<S> = Matrix<SparseVector<S>>;

/// Two-dimensional view over a shared backing vector.
///
/// The logical element `(i, j)` lives at backing index
///
/// ```text
/// transposed ? (col_offset + j) * row_max + (row_offset + i)
///            : (row_offset + i) * col_max + (col_offset + j)
/// ```
///
/// Two scratch vectors, `tmp1` (length ≥ rows) and `tmp2` (length ≥ cols),
/// are shared by all views of the same matrix and swap roles under
/// transposition.
#[derive(Debug)]
pub struct Matrix<V: Vector> {
    values: Rc<RefCell<V>>,
    rows: usize,
    cols: usize,
    row_offset: usize,
    row_max: usize,
    col_offset: usize,
    col_max: usize,
    transposed: bool,
    tmp1: Rc<RefCell<V>>,
    tmp2: Rc<RefCell<V>>,
}

fn shared<V>(v: V) -> Rc<RefCell<V>> {
    Rc::new(RefCell::new(v))
}

impl<V: Vector> Matrix<V> {
    /// Wrap a row-major backing vector of length `rows * cols`.
    pub fn from_vector(rows: usize, cols: usize, values: V) -> Result<Self> {
        check_dim(element_count(rows, cols)?, values.dim())?;
        Ok(Matrix {
            values: shared(values),
            rows,
            cols,
            row_offset: 0,
            row_max: rows,
            col_offset: 0,
            col_max: cols,
            transposed: false,
            tmp1: shared(V::null(rows)),
            tmp2: shared(V::null(cols)),
        })
    }

    /// All-zero matrix. Sparse backings store no entries.
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows `usize`.
    pub fn null(rows: usize, cols: usize) -> Self {
        let len = match element_count(rows, cols) {
            Ok(len) => len,
            Err(e) => panic!("{e}"),
        };
        Matrix {
            values: shared(V::null(len)),
            rows,
            cols,
            row_offset: 0,
            row_max: rows,
            col_offset: 0,
            col_max: cols,
            transposed: false,
            tmp1: shared(V::null(rows)),
            tmp2: shared(V::null(cols)),
        }
    }

    /// Build from a row-major list of `rows * cols` values.
    pub fn from_values(rows: usize, cols: usize, values: &[f64]) -> Result<Self> {
        check_dim(element_count(rows, cols)?, values.len())?;
        let m = Self::null(rows, cols);
        {
            let mut backing = m.values.borrow_mut();
            for (k, &x) in values.iter().enumerate() {
                if x != 0.0 {
                    backing.at(k).set_value(x);
                }
            }
        }
        Ok(m)
    }

    /// Build from parallel row, column and value lists.
    pub fn from_triplets(
        rows: usize,
        cols: usize,
        row_idx: &[usize],
        col_idx: &[usize],
        values: &[f64],
    ) -> Result<Self> {
        check_dim(row_idx.len(), col_idx.len())?;
        check_dim(row_idx.len(), values.len())?;
        element_count(rows, cols)?;
        let mut m = Self::null(rows, cols);
        for ((&i, &j), &x) in row_idx.iter().zip(col_idx).zip(values) {
            m.try_at(i, j)?.set_value(x);
        }
        Ok(m)
    }

    /// `n × n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::null(n, n);
        for i in 0..n {
            m.at(i, i).set_value(1.0);
        }
        m
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Whether this header is a transposed view of its backing.
    #[inline]
    pub fn is_transposed(&self) -> bool {
        self.transposed
    }

    /// Whether two matrices share their backing storage.
    pub fn shares_storage<W: Vector>(&self, other: &Matrix<W>) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.values) as *const u8,
            Rc::as_ptr(&other.values) as *const u8,
        )
    }

    /// Backing index of logical position `(i, j)`. Not bounds-checked.
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        if self.transposed {
            (self.col_offset + j) * self.row_max + (self.row_offset + i)
        } else {
            (self.row_offset + i) * self.col_max + (self.col_offset + j)
        }
    }

    /// Logical position of backing index `k`, if it falls inside this view.
    fn logical(&self, k: usize) -> Option<(usize, usize)> {
        let (outer, inner) = if self.transposed {
            (k / self.row_max, k % self.row_max)
        } else {
            (k / self.col_max, k % self.col_max)
        };
        let (r, c) = if self.transposed {
            (inner, outer)
        } else {
            (outer, inner)
        };
        let i = r.checked_sub(self.row_offset)?;
        let j = c.checked_sub(self.col_offset)?;
        (i < self.rows && j < self.cols).then_some((i, j))
    }

    /// Whether this header covers its whole backing vector.
    fn is_full(&self) -> bool {
        self.row_offset == 0
            && self.col_offset == 0
            && self.rows == self.row_max
            && self.cols == self.col_max
    }

    /// Logical positions of the stored entries inside this view, in backing
    /// order. Dense backings report every position.
    pub(crate) fn support(&self) -> Vec<(usize, usize)> {
        let values = self.values.borrow();
        values
            .const_iter()
            .filter_map(|(k, _)| self.logical(k))
            .collect()
    }

    fn check(&self, i: usize, j: usize) -> Result<()> {
        check_index(i, self.rows)?;
        check_index(j, self.cols)
    }

    fn assert_in(&self, i: usize, j: usize) {
        if let Err(e) = self.check(i, j) {
            panic!("{e}");
        }
    }

    /// Element `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `(i, j)` is out of range or the backing is mutably borrowed.
    pub fn const_at(&self, i: usize, j: usize) -> Ref<'_, V::Elem> {
        self.assert_in(i, j);
        let k = self.index(i, j);
        Ref::map(self.values.borrow(), |v| v.const_at(k))
    }

    pub fn try_const_at(&self, i: usize, j: usize) -> Result<Ref<'_, V::Elem>> {
        self.check(i, j)?;
        Ok(self.const_at(i, j))
    }

    /// Mutable element `(i, j)`; sparse backings allocate the entry if absent.
    ///
    /// # Panics
    ///
    /// Panics if `(i, j)` is out of range or the backing is already borrowed.
    pub fn at(&mut self, i: usize, j: usize) -> RefMut<'_, V::Elem> {
        self.assert_in(i, j);
        let k = self.index(i, j);
        RefMut::map(self.values.borrow_mut(), |v| v.at(k))
    }

    pub fn try_at(&mut self, i: usize, j: usize) -> Result<RefMut<'_, V::Elem>> {
        self.check(i, j)?;
        Ok(self.at(i, j))
    }

    /// Value of element `(i, j)`.
    #[inline]
    pub fn value_at(&self, i: usize, j: usize) -> f64 {
        self.const_at(i, j).value()
    }

    /// Row-major values of the visible region.
    pub fn values(&self) -> Vec<f64> {
        let mut values = vec![0.0; self.rows * self.cols];
        let backing = self.values.borrow();
        for (k, s) in backing.const_iter() {
            if let Some((i, j)) = self.logical(k) {
                values[i * self.cols + j] = s.value();
            }
        }
        values
    }

    /// Number of stored entries inside this view.
    pub fn nnz(&self) -> usize {
        self.support().len()
    }

    /// Shared handle to the backing vector.
    pub fn backing(&self) -> Ref<'_, V> {
        self.values.borrow()
    }

    /// Scratch vector of length at least `rows()`.
    pub fn tmp1(&self) -> RefMut<'_, V> {
        self.tmp1.borrow_mut()
    }

    /// Scratch vector of length at least `cols()`.
    pub fn tmp2(&self) -> RefMut<'_, V> {
        self.tmp2.borrow_mut()
    }

    /// Grow the scratch vectors to the current shape if needed.
    pub fn init_tmp(&mut self) {
        if self.tmp1.borrow().dim() < self.rows {
            self.tmp1 = shared(V::null(self.rows));
        }
        if self.tmp2.borrow().dim() < self.cols {
            self.tmp2 = shared(V::null(self.cols));
        }
    }

    // ── Views ──

    /// Transposed view sharing storage. O(1).
    pub fn t(&self) -> Self {
        Matrix {
            values: Rc::clone(&self.values),
            rows: self.cols,
            cols: self.rows,
            row_offset: self.col_offset,
            row_max: self.col_max,
            col_offset: self.row_offset,
            col_max: self.row_max,
            transposed: !self.transposed,
            tmp1: Rc::clone(&self.tmp2),
            tmp2: Rc::clone(&self.tmp1),
        }
    }

    /// View of rows `[rfrom, rto)` and columns `[cfrom, cto)` sharing storage.
    pub fn slice(&self, rfrom: usize, rto: usize, cfrom: usize, cto: usize) -> Result<Self> {
        crate::vector::check_range(rfrom, rto, self.rows)?;
        crate::vector::check_range(cfrom, cto, self.cols)?;
        let mut m = Matrix {
            values: Rc::clone(&self.values),
            rows: rto - rfrom,
            cols: cto - cfrom,
            row_offset: self.row_offset + rfrom,
            row_max: self.row_max,
            col_offset: self.col_offset + cfrom,
            col_max: self.col_max,
            transposed: self.transposed,
            tmp1: Rc::clone(&self.tmp1),
            tmp2: Rc::clone(&self.tmp2),
        };
        m.init_tmp();
        Ok(m)
    }

    /// Zero-copy view of row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows()` or the backing is mutably borrowed.
    pub fn row_view(&self, i: usize) -> MatrixLine<'_, V> {
        if let Err(e) = check_index(i, self.rows) {
            panic!("{e}");
        }
        let stride = if self.transposed { self.row_max } else { 1 };
        MatrixLine::new(self.values.borrow(), self.index(i, 0), stride, self.cols)
    }

    /// Zero-copy view of column `j`.
    ///
    /// # Panics
    ///
    /// Panics if `j >= cols()` or the backing is mutably borrowed.
    pub fn col_view(&self, j: usize) -> MatrixLine<'_, V> {
        if let Err(e) = check_index(j, self.cols) {
            panic!("{e}");
        }
        let stride = if self.transposed { 1 } else { self.col_max };
        MatrixLine::new(self.values.borrow(), self.index(0, j), stride, self.rows)
    }

    fn copy_line(line: MatrixLine<'_, V>) -> V {
        let mut r = V::null(line.dim());
        for (k, s) in line.const_iter() {
            *r.at(k) = s.clone();
        }
        r
    }

    /// Copy of row `i`.
    pub fn row(&self, i: usize) -> Result<V> {
        check_index(i, self.rows)?;
        Ok(Self::copy_line(self.row_view(i)))
    }

    /// Copy of column `j`.
    pub fn col(&self, j: usize) -> Result<V> {
        check_index(j, self.cols)?;
        Ok(Self::copy_line(self.col_view(j)))
    }

    /// Copy of the diagonal.
    pub fn diag(&self) -> Result<V> {
        self.check_square()?;
        let backing = self.values.borrow();
        let mut r = V::null(self.rows);
        for i in 0..self.rows {
            let s = backing.const_at(self.index(i, i));
            if !s.is_structural_zero() {
                *r.at(i) = s.clone();
            }
        }
        Ok(r)
    }

    pub(crate) fn check_square(&self) -> Result<()> {
        if self.rows != self.cols {
            return Err(Error::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    // ── Permutations ──

    /// Exchange elements `(i1, j1)` and `(i2, j2)`.
    ///
    /// # Panics
    ///
    /// Panics if either position is out of range.
    pub fn swap(&mut self, i1: usize, j1: usize, i2: usize, j2: usize) {
        self.assert_in(i1, j1);
        self.assert_in(i2, j2);
        let (k1, k2) = (self.index(i1, j1), self.index(i2, j2));
        self.values.borrow_mut().swap(k1, k2);
    }

    fn swap_rows_unchecked(&mut self, i1: usize, i2: usize) {
        if i1 == i2 {
            return;
        }
        for j in 0..self.cols {
            self.swap(i1, j, i2, j);
        }
    }

    fn swap_columns_unchecked(&mut self, j1: usize, j2: usize) {
        if j1 == j2 {
            return;
        }
        for i in 0..self.rows {
            self.swap(i, j1, i, j2);
        }
    }

    /// Exchange rows `i1` and `i2` of a square matrix.
    pub fn swap_rows(&mut self, i1: usize, i2: usize) -> Result<()> {
        self.check_square()?;
        check_index(i1, self.rows)?;
        check_index(i2, self.rows)?;
        self.swap_rows_unchecked(i1, i2);
        Ok(())
    }

    /// Exchange columns `j1` and `j2` of a square matrix.
    pub fn swap_columns(&mut self, j1: usize, j2: usize) -> Result<()> {
        self.check_square()?;
        check_index(j1, self.cols)?;
        check_index(j2, self.cols)?;
        self.swap_columns_unchecked(j1, j2);
        Ok(())
    }

    /// Reorder rows so that new row `i` is old row `pi[i]`.
    pub fn permute_rows(&mut self, pi: &[usize]) -> Result<()> {
        check_permutation(pi, self.rows)?;
        follow_cycles(pi, |a, b| self.swap_rows_unchecked(a, b));
        Ok(())
    }

    /// Reorder columns so that new column `j` is old column `pi[j]`.
    pub fn permute_columns(&mut self, pi: &[usize]) -> Result<()> {
        check_permutation(pi, self.cols)?;
        follow_cycles(pi, |a, b| self.swap_columns_unchecked(a, b));
        Ok(())
    }

    /// `A ← P·A·Pᵀ`: new element `(i, j)` is old element `(pi[i], pi[j])`.
    pub fn symmetric_permutation(&mut self, pi: &[usize]) -> Result<()> {
        self.check_square()?;
        self.permute_rows(pi)?;
        self.permute_columns(pi)
    }

    /// Transpose in place.
    ///
    /// A header covering its whole backing permutes the backing physically by
    /// cycle following, without a second backing array. A square slice swaps
    /// across its diagonal, which parent views observe. A rectangular slice
    /// cannot be transposed within its parent's storage and is detached into
    /// a compact transposed copy.
    ///
    /// Other headers over the same full backing see permuted storage
    /// afterwards and should be discarded.
    pub fn tip(&mut self) {
        if self.is_full() {
            self.tip_full();
        } else if self.is_square() {
            for i in 0..self.rows {
                for j in i + 1..self.cols {
                    self.swap(i, j, j, i);
                }
            }
        } else {
            log::debug!(
                "tip: detaching {}x{} slice into a transposed copy",
                self.rows,
                self.cols
            );
            *self = self.t().clone();
        }
    }

    fn tip_full(&mut self) {
        // Physical layout is p × q row-major; transposing it moves position
        // r*q + c to c*p + r, i.e. d(x) = x*p mod (p*q - 1).
        let (p, q) = if self.transposed {
            (self.col_max, self.row_max)
        } else {
            (self.row_max, self.col_max)
        };
        let len = p * q;
        if len > 2 {
            let m = (len - 1) as u128;
            let dest = |x: usize| -> usize {
                if x == len - 1 {
                    x
                } else {
                    ((x as u128 * p as u128) % m) as usize
                }
            };
            let mut backing = self.values.borrow_mut();
            backing.remap(dest);
            log::trace!("tip: {p}x{q} backing permuted, {} stored entries", backing.nnz());
        }
        std::mem::swap(&mut self.rows, &mut self.cols);
        std::mem::swap(&mut self.row_max, &mut self.col_max);
        std::mem::swap(&mut self.tmp1, &mut self.tmp2);
    }
}

/// Apply the permutation `new[i] = old[pi[i]]` through pairwise swaps.
fn follow_cycles<F: FnMut(usize, usize)>(pi: &[usize], mut swap: F) {
    let mut done = vec![false; pi.len()];
    for start in 0..pi.len() {
        if done[start] {
            continue;
        }
        let mut j = start;
        while pi[j] != start {
            swap(j, pi[j]);
            done[j] = true;
            j = pi[j];
        }
        done[j] = true;
    }
}

impl<V: Vector> Clone for Matrix<V> {
    /// Deep copy of the visible region into a compact row-major matrix.
    fn clone(&self) -> Self {
        if self.is_full() && !self.transposed {
            return Matrix {
                values: shared(self.values.borrow().clone()),
                rows: self.rows,
                cols: self.cols,
                row_offset: 0,
                row_max: self.rows,
                col_offset: 0,
                col_max: self.cols,
                transposed: false,
                tmp1: shared(V::null(self.rows)),
                tmp2: shared(V::null(self.cols)),
            };
        }
        let m: Matrix<V> = Matrix::null(self.rows, self.cols);
        {
            let src = self.values.borrow();
            let mut dst = m.values.borrow_mut();
            for (k, s) in src.const_iter() {
                if let Some((i, j)) = self.logical(k) {
                    *dst.at(i * self.cols + j) = s.clone();
                }
            }
        }
        m
    }
}

impl<S: Scalar> SparseMatrix<S> {
    /// Empty sparse matrix.
    pub fn nil(rows: usize, cols: usize) -> Self {
        Self::null(rows, cols)
    }
}
