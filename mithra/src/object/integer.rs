//! Integer implementation.

use std::fmt::Display;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};


/// An integer of unbounded size.
///
/// Anything that fits in 64 bits is stored as a machine integer, so that two
/// equal numbers always have the same representation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum IntVariant {
    /// Machine integers.
    Small(i64),

    /// Bignums, always outside the range of `i64`.
    Big(Rc<BigInt>),
}

impl From<BigInt> for IntVariant {
    fn from(value: BigInt) -> Self {
        value.to_i64().map(Self::Small).unwrap_or_else(|| Self::Big(Rc::new(value)))
    }
}

impl From<i64> for IntVariant {
    fn from(value: i64) -> Self {
        Self::Small(value)
    }
}

impl From<i32> for IntVariant {
    fn from(value: i32) -> Self {
        Self::Small(value as i64)
    }
}

impl Display for IntVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Small(x) => f.write_fmt(format_args!("{}", x)),
            Self::Big(x) => f.write_fmt(format_args!("{}", x)),
        }
    }
}

impl IntVariant {
    /// Sum of two integers.
    pub fn add(&self, other: &IntVariant) -> IntVariant {
        self.operate(other, i64::checked_add, |x, y| x + y)
    }

    /// Difference of two integers.
    pub fn sub(&self, other: &IntVariant) -> IntVariant {
        self.operate(other, i64::checked_sub, |x, y| x - y)
    }

    /// Product of two integers.
    pub fn mul(&self, other: &IntVariant) -> IntVariant {
        self.operate(other, i64::checked_mul, |x, y| x * y)
    }

    /// Mathematical ratio of two integers. The caller checks for zero.
    pub fn div(&self, other: &IntVariant) -> f64 {
        match (self, other) {
            (Self::Small(x), Self::Small(y)) => (*x as f64) / (*y as f64),
            _ => self.to_f64() / other.to_f64(),
        }
    }

    /// Apply `ixi` to two machine integers, falling back to `bxb` on bignums
    /// if either operand is big or `ixi` overflows.
    fn operate(
        &self,
        other: &IntVariant,
        ixi: impl Fn(i64, i64) -> Option<i64>,
        bxb: impl Fn(&BigInt, &BigInt) -> BigInt,
    ) -> IntVariant {
        match (self, other) {
            (Self::Small(x), Self::Small(y)) => ixi(*x, *y)
                .map(Self::Small)
                .unwrap_or_else(|| Self::from(bxb(&BigInt::from(*x), &BigInt::from(*y)))),
            _ => Self::from(bxb(&self.to_big(), &other.to_big())),
        }
    }

    pub fn to_big(&self) -> BigInt {
        match self {
            Self::Small(x) => BigInt::from(*x),
            Self::Big(x) => BigInt::clone(x),
        }
    }

    /// Convert to the nearest float. Bignums beyond the float range become
    /// infinite.
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Small(x) => *x as f64,
            Self::Big(x) => x.to_f64().unwrap_or(f64::NAN),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Small(x) => *x == 0,
            Self::Big(x) => x.is_zero(),
        }
    }

    /// Exact numeric comparison with a float.
    pub fn eq_float(&self, other: f64) -> bool {
        if other.fract() != 0.0 {
            return false;
        }
        match self {
            Self::Small(x) => i64::from_f64(other) == Some(*x),
            Self::Big(x) => BigInt::from_f64(other).as_ref() == Some(&**x),
        }
    }
}
