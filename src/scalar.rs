//! The [`ConstScalar`] and [`Scalar`] traits for writing element-kind generic code.
//!
//! Containers are generic over `S: Scalar` and work transparently with plain
//! `f64` (value only) and [`Real`](crate::Real) (value plus gradient and,
//! at order 2, Hessian). Operands of every arithmetic method are taken as
//! `&impl ConstScalar`, so kinds can be mixed freely: `r.mul(&x, &2.0)`.

use std::fmt::Debug;

/// Read access to a scalar and its derivative information.
///
/// Kinds without derivatives only implement [`value`](Self::value); the
/// remaining methods default to an order-0 constant.
pub trait ConstScalar {
    /// Primal value.
    fn value(&self) -> f64;

    /// Number of derivative levels carried: 0, 1 or 2.
    #[inline]
    fn order(&self) -> usize {
        0
    }

    /// Number of free variables the derivatives are taken with respect to.
    #[inline]
    fn n_variables(&self) -> usize {
        0
    }

    /// First derivative with respect to variable `i` (0 when not carried).
    #[inline]
    fn derivative(&self, _i: usize) -> f64 {
        0.0
    }

    /// Second derivative with respect to variables `i` and `j` (0 when not carried).
    #[inline]
    fn hessian(&self, _i: usize, _j: usize) -> f64 {
        0.0
    }

    /// Whether value and all carried derivative components are exactly 0.0.
    fn is_structural_zero(&self) -> bool {
        if self.value() != 0.0 {
            return false;
        }
        let n = self.n_variables();
        let order = self.order();
        (order < 1 || (0..n).all(|i| self.derivative(i) == 0.0))
            && (order < 2 || (0..n).all(|i| (0..n).all(|j| self.hessian(i, j) == 0.0)))
    }
}

/// The element capability every container is generic over.
///
/// Arithmetic writes into `self` from borrowed operands, so hot loops reuse
/// the destination's derivative storage instead of allocating. All provided
/// methods reduce to the two chain-rule kernels [`monadic`](Self::monadic)
/// and [`dyadic`](Self::dyadic).
pub trait Scalar: ConstScalar + Clone + Debug + Default + Send + 'static {
    /// Lift a plain value to this kind (constant, order 0).
    fn from_value(value: f64) -> Self;

    /// Overwrite the primal value, leaving derivatives untouched.
    fn set_value(&mut self, value: f64);

    /// Copy value and derivatives from `a`.
    fn set<A: ConstScalar + ?Sized>(&mut self, a: &A);

    /// Zero the value and all derivative storage, keeping the order.
    fn reset(&mut self);

    /// `self = f(a)` given `f(a)`, `f'(a)` and `f''(a)`.
    fn monadic<A: ConstScalar + ?Sized>(&mut self, a: &A, v0: f64, f1: f64, f2: f64);

    /// `self = f(a, b)` given the value and the first and second partials.
    #[allow(clippy::too_many_arguments)]
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
    );

    // ── Arithmetic ──

    #[inline]
    fn add<A: ConstScalar + ?Sized, B: ConstScalar + ?Sized>(&mut self, a: &A, b: &B) {
        self.dyadic(a, b, a.value() + b.value(), 1.0, 1.0, 0.0, 0.0, 0.0);
    }

    #[inline]
    fn sub<A: ConstScalar + ?Sized, B: ConstScalar + ?Sized>(&mut self, a: &A, b: &B) {
        self.dyadic(a, b, a.value() - b.value(), 1.0, -1.0, 0.0, 0.0, 0.0);
    }

    #[inline]
    fn mul<A: ConstScalar + ?Sized, B: ConstScalar + ?Sized>(&mut self, a: &A, b: &B) {
        let (x, y) = (a.value(), b.value());
        self.dyadic(a, b, x * y, y, x, 0.0, 1.0, 0.0);
    }

    #[inline]
    fn div<A: ConstScalar + ?Sized, B: ConstScalar + ?Sized>(&mut self, a: &A, b: &B) {
        let (x, y) = (a.value(), b.value());
        let inv = 1.0 / y;
        let inv2 = inv * inv;
        self.dyadic(a, b, x * inv, inv, -x * inv2, 0.0, -inv2, 2.0 * x * inv2 * inv);
    }

    #[inline]
    fn neg<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        self.monadic(a, -a.value(), -1.0, 0.0);
    }

    // ── Powers ──

    fn sqrt<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        let s = a.value().sqrt();
        self.monadic(a, s, 0.5 / s, -0.25 / (s * s * s));
    }

    /// `a^k` for a constant real exponent.
    fn pow_f<A: ConstScalar + ?Sized>(&mut self, a: &A, k: f64) {
        let x = a.value();
        self.monadic(
            a,
            x.powf(k),
            k * x.powf(k - 1.0),
            k * (k - 1.0) * x.powf(k - 2.0),
        );
    }

    /// `a^b` with both base and exponent differentiable.
    ///
    /// A constant exponent takes the [`pow_f`](Self::pow_f) path, so a
    /// negative base keeps finite derivatives.
    fn pow<A: ConstScalar + ?Sized, B: ConstScalar + ?Sized>(&mut self, a: &A, b: &B) {
        let (x, y) = (a.value(), b.value());
        if b.order() == 0 {
            self.pow_f(a, y);
            return;
        }
        let v = x.powf(y);
        let ln = x.ln();
        let xm1 = x.powf(y - 1.0);
        self.dyadic(
            a,
            b,
            v,
            y * xm1,
            v * ln,
            y * (y - 1.0) * x.powf(y - 2.0),
            xm1 * (1.0 + y * ln),
            v * ln * ln,
        );
    }

    // ── Exp/Log ──

    fn exp<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        let e = a.value().exp();
        self.monadic(a, e, e, e);
    }

    fn exp_m1<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        let x = a.value();
        let e = x.exp();
        self.monadic(a, x.exp_m1(), e, e);
    }

    fn log<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        let x = a.value();
        self.monadic(a, x.ln(), 1.0 / x, -1.0 / (x * x));
    }

    fn log1p<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        let x = a.value();
        let inv = 1.0 / (1.0 + x);
        self.monadic(a, x.ln_1p(), inv, -inv * inv);
    }

    /// `log(exp(a) + exp(b))`, evaluated without overflow.
    fn log_add<A: ConstScalar + ?Sized, B: ConstScalar + ?Sized>(&mut self, a: &A, b: &B) {
        let (x, y) = (a.value(), b.value());
        let (hi, lo) = if x >= y { (x, y) } else { (y, x) };
        let v = if lo == f64::NEG_INFINITY {
            hi
        } else {
            hi + (lo - hi).exp().ln_1p()
        };
        let p = (x - v).exp();
        let q = (y - v).exp();
        self.dyadic(a, b, v, p, q, p * q, -p * q, p * q);
    }

    /// Logistic sigmoid `1 / (1 + exp(-a))`.
    fn logistic<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        let s = 1.0 / (1.0 + (-a.value()).exp());
        let d = s * (1.0 - s);
        self.monadic(a, s, d, d * (1.0 - 2.0 * s));
    }

    // ── Trig ──

    fn sin<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        let (s, c) = a.value().sin_cos();
        self.monadic(a, s, c, -s);
    }

    fn cos<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        let (s, c) = a.value().sin_cos();
        self.monadic(a, c, -s, -c);
    }

    fn tan<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        let t = a.value().tan();
        let d = 1.0 + t * t;
        self.monadic(a, t, d, 2.0 * t * d);
    }

    // ── Hyperbolic ──

    fn sinh<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        let x = a.value();
        self.monadic(a, x.sinh(), x.cosh(), x.sinh());
    }

    fn cosh<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        let x = a.value();
        self.monadic(a, x.cosh(), x.sinh(), x.cosh());
    }

    fn tanh<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        let t = a.value().tanh();
        let d = 1.0 - t * t;
        self.monadic(a, t, d, -2.0 * t * d);
    }

    // ── Misc ──

    fn abs<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        let x = a.value();
        let sign = if x < 0.0 { -1.0 } else { 1.0 };
        self.monadic(a, x.abs(), sign, 0.0);
    }
}

impl ConstScalar for f64 {
    #[inline]
    fn value(&self) -> f64 {
        *self
    }

    #[inline]
    fn is_structural_zero(&self) -> bool {
        *self == 0.0
    }
}

impl Scalar for f64 {
    #[inline]
    fn from_value(value: f64) -> Self {
        value
    }

    #[inline]
    fn set_value(&mut self, value: f64) {
        *self = value;
    }

    #[inline]
    fn set<A: ConstScalar + ?Sized>(&mut self, a: &A) {
        *self = a.value();
    }

    #[inline]
    fn reset(&mut self) {
        *self = 0.0;
    }

    #[inline]
    fn monadic<A: ConstScalar + ?Sized>(&mut self, _a: &A, v0: f64, _f1: f64, _f2: f64) {
        *self = v0;
    }

    #[inline]
    fn dyadic<A: ConstScalar + ?Sized, B: ConstScalar + ?Sized>(
        &mut self,
        _a: &A,
        _b: &B,
        v0: f64,
        _fa: f64,
        _fb: f64,
        _faa: f64,
        _fab: f64,
        _fbb: f64,
    ) {
        *self = v0;
    }
}
