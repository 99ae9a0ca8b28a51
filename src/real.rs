use std::fmt::{self, Display};

use crate::error::Error;
use crate::scalar::{ConstScalar, Scalar};

/// Forward-mode differentiable real: a value with an optional gradient and Hessian.
///
/// The derivative `order` is a runtime field (0, 1 or 2) fixed at
/// construction or by [`set_order`](Self::set_order); arithmetic sets the
/// destination's order from its operands:
///
/// - an order-0 operand is a constant with exactly zero derivatives and
///   combines without loss;
/// - two derivative-carrying operands of different order yield the smaller
///   order, since the missing Hessian is unknown rather than zero;
/// - two derivative-carrying operands must agree on the number of variables.
///
/// The Hessian is stored flat (`n*n`, row-major) and kept symmetric.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Real {
    value: f64,
    order: usize,
    n: usize,
    derivative: Vec<f64>,
    hessian: Vec<f64>,
    variable: Option<usize>,
}

impl Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl From<f64> for Real {
    #[inline]
    fn from(value: f64) -> Self {
        Real::new(value)
    }
}

impl Real {
    /// Create a constant of order 0.
    #[inline]
    pub fn new(value: f64) -> Self {
        Real {
            value,
            ..Real::default()
        }
    }

    /// Create a constant with zeroed derivative storage for `n` variables.
    pub fn with_order(value: f64, n: usize, order: usize) -> Self {
        let mut r = Real::new(value);
        r.set_order(n, order);
        r
    }

    /// Create independent variable `i` of `n`: one-hot gradient, zero Hessian.
    pub fn variable(value: f64, i: usize, n: usize, order: usize) -> Self {
        let mut r = Real::new(value);
        r.set_variable(i, n, order);
        r
    }

    /// Reallocate derivative storage for `n` variables at `order`, zeroing it.
    ///
    /// # Panics
    ///
    /// Panics if `order > 2`.
    pub fn set_order(&mut self, n: usize, order: usize) {
        assert!(order <= 2, "derivative order must be 0, 1 or 2, got {order}");
        self.alloc(n, order);
        self.derivative.iter_mut().for_each(|d| *d = 0.0);
        self.hessian.iter_mut().for_each(|h| *h = 0.0);
        self.variable = None;
    }

    /// Declare this scalar as independent variable `i` of `n`, keeping its value.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n` (for `order > 0`) or `order > 2`.
    pub fn set_variable(&mut self, i: usize, n: usize, order: usize) {
        self.set_order(n, order);
        if order > 0 {
            if i >= n {
                panic!("{}", Error::IndexOutOfRange { index: i, dim: n });
            }
            self.derivative[i] = 1.0;
        }
        self.variable = Some(i);
    }

    /// Index of the variable this scalar was declared as, if any.
    ///
    /// Cleared whenever the scalar is overwritten by arithmetic.
    #[inline]
    pub fn variable_index(&self) -> Option<usize> {
        self.variable
    }

    /// Gradient (empty at order 0).
    #[inline]
    pub fn gradient(&self) -> &[f64] {
        &self.derivative
    }

    /// Row `i` of the Hessian (empty below order 2).
    pub fn hessian_row(&self, i: usize) -> &[f64] {
        if self.order < 2 {
            return &[];
        }
        if i >= self.n {
            panic!("{}", Error::IndexOutOfRange { index: i, dim: self.n });
        }
        &self.hessian[i * self.n..(i + 1) * self.n]
    }

    fn alloc(&mut self, n: usize, order: usize) {
        self.order = order;
        self.n = if order > 0 { n } else { 0 };
        let nd = if order >= 1 { n } else { 0 };
        let nh = if order >= 2 { n * n } else { 0 };
        self.derivative.resize(nd, 0.0);
        self.hessian.resize(nh, 0.0);
    }
}

/// Order and variable count of the result of a binary operation.
fn combined_shape<A, B>(a: &A, b: &B) -> (usize, usize)
where
    A: ConstScalar + ?Sized,
    B: ConstScalar + ?Sized,
{
    match (a.order(), b.order()) {
        (0, 0) => (0, 0),
        (0, ob) => (ob, b.n_variables()),
        (oa, 0) => (oa, a.n_variables()),
        (oa, ob) => {
            let (na, nb) = (a.n_variables(), b.n_variables());
            if na != nb {
                panic!(
                    "{}",
                    Error::DimensionMismatch {
                        expected: na,
                        actual: nb
                    }
                );
            }
            (oa.min(ob), na)
        }
    }
}

impl ConstScalar for Real {
    #[inline]
    fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    fn order(&self) -> usize {
        self.order
    }

    #[inline]
    fn n_variables(&self) -> usize {
        self.n
    }

    #[inline]
    fn derivative(&self, i: usize) -> f64 {
        self.derivative.get(i).copied().unwrap_or(0.0)
    }

    #[inline]
    fn hessian(&self, i: usize, j: usize) -> f64 {
        if self.order < 2 || i >= self.n || j >= self.n {
            return 0.0;
        }
        self.hessian[i * self.n + j]
    }

    fn is_structural_zero(&self) -> bool {
        self.value == 0.0
            && self.derivative.iter().all(|&d| d == 0.0)
            && self.hessian.iter().all(|&h| h == 0.0)
    }
}

impl Scalar for Real {
    #[inline]
    fn from_value(value: f64) -> Self {
        Real::new(value)
    }

    #[inline]
    fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    fn set<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        let n = a.n_variables();
        self.alloc(n, a.order());
        self.value = a.value();
        for i in 0..self.derivative.len() {
            self.derivative[i] = a.derivative(i);
        }
        if self.order >= 2 {
            for i in 0..n {
                for j in 0..n {
                    self.hessian[i * n + j] = a.hessian(i, j);
                }
            }
        }
        self.variable = None;
    }

    fn reset(&mut self) {
        self.value = 0.0;
        self.derivative.iter_mut().for_each(|d| *d = 0.0);
        self.hessian.iter_mut().for_each(|h| *h = 0.0);
        self.variable = None;
    }

    fn monadic<A: ConstScalar + ?Sized>(&mut self, a: &A, v0: f64, f1: f64, f2: f64) {
        let order = a.order();
        let n = a.n_variables();
        self.alloc(n, order);
        self.value = v0;
        self.variable = None;
        if order >= 1 {
            for i in 0..n {
                self.derivative[i] = f1 * a.derivative(i);
            }
        }
        if order >= 2 {
            for i in 0..n {
                let ai = a.derivative(i);
                for j in 0..=i {
                    let h = f1 * a.hessian(i, j) + f2 * ai * a.derivative(j);
                    self.hessian[i * n + j] = h;
                    self.hessian[j * n + i] = h;
                }
            }
        }
    }

    fn dyadic<A: ConstScalar + ?Sized, B: ConstScalar + ?Sized>(
        &mut self,
        a: &A,
        b: &B,
        v0: f64,
        fa: f64,
        fb: f64,
        faa: f64,
        fab: f64,
        fbb: f64,
    ) {
        let (order, n) = combined_shape(a, b);
        self.alloc(n, order);
        self.value = v0;
        self.variable = None;
        if order >= 1 {
            for i in 0..n {
                self.derivative[i] = fa * a.derivative(i) + fb * b.derivative(i);
            }
        }
        if order >= 2 {
            for i in 0..n {
                let (ai, bi) = (a.derivative(i), b.derivative(i));
                for j in 0..=i {
                    let (aj, bj) = (a.derivative(j), b.derivative(j));
                    let h = fa * a.hessian(i, j)
                        + fb * b.hessian(i, j)
                        + faa * ai * aj
                        + fab * (ai * bj + bi * aj)
                        + fbb * bi * bj;
                    self.hessian[i * n + j] = h;
                    self.hessian[j * n + i] = h;
                }
            }
        }
    }
}
