use num_traits::{One, Zero};

use crate::real::Real;
use crate::scalar::ConstScalar;

// ══════════════════════════════════════════════
//  Real
// ══════════════════════════════════════════════

impl Zero for Real {
    #[inline]
    fn zero() -> Self {
        Real::new(0.0)
    }

    /// True only for a structural zero: a value of 0.0 with nonzero
    /// derivatives is not zero.
    #[inline]
    fn is_zero(&self) -> bool {
        self.is_structural_zero()
    }
}

impl One for Real {
    #[inline]
    fn one() -> Self {
        Real::new(1.0)
    }
}
