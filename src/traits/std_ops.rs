use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::real::Real;
use crate::scalar::Scalar;

// ──────────────────────────────────────────────
//  Real operators
// ──────────────────────────────────────────────
//
// The in-place kernels live on `Scalar`; the operators below allocate a
// fresh result and delegate.

macro_rules! impl_real_binary_op {
    ($trait:ident, $method:ident, $kernel:path) => {
        impl $trait<&Real> for &Real {
            type Output = Real;
            #[inline]
            fn $method(self, rhs: &Real) -> Real {
                let mut r = Real::default();
                $kernel(&mut r, self, rhs);
                r
            }
        }

        impl $trait for Real {
            type Output = Real;
            #[inline]
            fn $method(self, rhs: Real) -> Real {
                $trait::$method(&self, &rhs)
            }
        }

        impl $trait<f64> for &Real {
            type Output = Real;
            #[inline]
            fn $method(self, rhs: f64) -> Real {
                let mut r = Real::default();
                $kernel(&mut r, self, &rhs);
                r
            }
        }

        impl $trait<f64> for Real {
            type Output = Real;
            #[inline]
            fn $method(self, rhs: f64) -> Real {
                $trait::$method(&self, rhs)
            }
        }

        impl $trait<&Real> for f64 {
            type Output = Real;
            #[inline]
            fn $method(self, rhs: &Real) -> Real {
                let mut r = Real::default();
                $kernel(&mut r, &self, rhs);
                r
            }
        }

        impl $trait<Real> for f64 {
            type Output = Real;
            #[inline]
            fn $method(self, rhs: Real) -> Real {
                $trait::$method(self, &rhs)
            }
        }
    };
}

impl_real_binary_op!(Add, add, Scalar::add);
impl_real_binary_op!(Sub, sub, Scalar::sub);
impl_real_binary_op!(Mul, mul, Scalar::mul);
impl_real_binary_op!(Div, div, Scalar::div);

macro_rules! impl_real_assign_op {
    ($trait:ident, $method:ident, $kernel:path) => {
        impl $trait<&Real> for Real {
            #[inline]
            fn $method(&mut self, rhs: &Real) {
                let lhs = std::mem::take(self);
                $kernel(self, &lhs, rhs);
            }
        }

        impl $trait for Real {
            #[inline]
            fn $method(&mut self, rhs: Real) {
                $trait::$method(self, &rhs);
            }
        }

        impl $trait<f64> for Real {
            #[inline]
            fn $method(&mut self, rhs: f64) {
                let lhs = std::mem::take(self);
                $kernel(self, &lhs, &rhs);
            }
        }
    };
}

impl_real_assign_op!(AddAssign, add_assign, Scalar::add);
impl_real_assign_op!(SubAssign, sub_assign, Scalar::sub);
impl_real_assign_op!(MulAssign, mul_assign, Scalar::mul);
impl_real_assign_op!(DivAssign, div_assign, Scalar::div);

impl Neg for &Real {
    type Output = Real;
    #[inline]
    fn neg(self) -> Real {
        let mut r = Real::default();
        Scalar::neg(&mut r, self);
        r
    }
}

impl Neg for Real {
    type Output = Real;
    #[inline]
    fn neg(self) -> Real {
        -&self
    }
}
