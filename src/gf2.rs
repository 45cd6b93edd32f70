//! Finite field GF(2) arithmetic.
//!
//! This module contains the struct [GF2], which implements the finite field
//! arithmetic in GF(2). It is the scalar used by the dense matrices of the
//! systematic encoder, and it converts to and from the unpacked bits (one
//! byte per bit) used at the codec boundary.

use core::iter::Sum;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};
use ndarray::ScalarOperand;
use num_traits::{One, Zero};

/// Finite field GF(2) element.
///
/// This struct represents an element of the finite field GF(2).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct GF2(u8);

impl GF2 {
    /// Converts an unpacked bit into a GF(2) element.
    ///
    /// Any nonzero byte is interpreted as a one.
    pub fn from_bit(bit: u8) -> GF2 {
        GF2(u8::from(bit != 0))
    }

    /// Returns the element as an unpacked bit (`0` or `1`).
    pub fn to_bit(self) -> u8 {
        self.0
    }
}

impl From<bool> for GF2 {
    fn from(b: bool) -> GF2 {
        GF2(u8::from(b))
    }
}

impl From<GF2> for bool {
    fn from(x: GF2) -> bool {
        x.0 != 0
    }
}

impl Zero for GF2 {
    fn zero() -> GF2 {
        GF2(0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl One for GF2 {
    fn one() -> GF2 {
        GF2(1)
    }

    fn is_one(&self) -> bool {
        self.0 == 1
    }
}

// Implements a binary operation, its by-reference variant and its assigning
// variants, in terms of an operation on the underlying bits.
macro_rules! impl_bit_op {
    ($op:ident, $method:ident, $op_assign:ident, $assign_method:ident, |$a:ident, $b:ident| $bits:expr) => {
        impl $op for GF2 {
            type Output = GF2;

            #[allow(clippy::suspicious_arithmetic_impl)]
            fn $method(self, rhs: GF2) -> GF2 {
                let ($a, $b) = (self.0, rhs.0);
                GF2($bits)
            }
        }

        impl $op<&GF2> for GF2 {
            type Output = GF2;

            fn $method(self, rhs: &GF2) -> GF2 {
                self.$method(*rhs)
            }
        }

        impl $op_assign for GF2 {
            fn $assign_method(&mut self, rhs: GF2) {
                *self = self.$method(rhs);
            }
        }

        impl $op_assign<&GF2> for GF2 {
            fn $assign_method(&mut self, rhs: &GF2) {
                *self = self.$method(*rhs);
            }
        }
    };
}

// addition and subtraction coincide in characteristic 2
impl_bit_op!(Add, add, AddAssign, add_assign, |a, b| a ^ b);
impl_bit_op!(Sub, sub, SubAssign, sub_assign, |a, b| a ^ b);
impl_bit_op!(Mul, mul, MulAssign, mul_assign, |a, b| a & b);
impl_bit_op!(Div, div, DivAssign, div_assign, |a, b| {
    assert!(b != 0, "division by zero in GF(2)");
    a
});

impl Sum for GF2 {
    fn sum<I: Iterator<Item = GF2>>(iter: I) -> GF2 {
        iter.fold(GF2::zero(), |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a GF2> for GF2 {
    fn sum<I: Iterator<Item = &'a GF2>>(iter: I) -> GF2 {
        iter.copied().sum()
    }
}

impl ScalarOperand for GF2 {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn field_tables() {
        let o = GF2(0);
        let i = GF2(1);
        // (a, b, a + b, a * b)
        let table = [(o, o, o, o), (o, i, i, o), (i, o, i, o), (i, i, o, i)];
        for (a, b, sum, product) in table {
            assert_eq!(a + b, sum);
            // subtraction and addition coincide in characteristic 2
            assert_eq!(a - b, sum);
            assert_eq!(a * b, product);
        }
        assert_eq!(o / i, o);
        assert_eq!(i / i, i);
    }

    #[test]
    fn parity_sum() {
        let bits = [1, 0, 1, 1, 0, 1].map(GF2::from_bit);
        assert_eq!(bits.iter().sum::<GF2>(), GF2::zero());
        assert_eq!(bits[..3].iter().sum::<GF2>(), GF2::zero());
        assert_eq!(bits[..4].iter().sum::<GF2>(), GF2::one());
    }

    #[test]
    fn bit_conversions() {
        assert_eq!(GF2::from_bit(0), GF2::zero());
        assert_eq!(GF2::from_bit(1), GF2::one());
        assert_eq!(GF2::from_bit(0xff), GF2::one());
        assert_eq!(GF2::one().to_bit(), 1);
        assert!(bool::from(GF2::from(true)));
        assert!(!bool::from(GF2::from(false)));
    }

    #[test]
    #[should_panic]
    fn div_by_zero() {
        let _a = GF2(1) / GF2(0);
    }
}
