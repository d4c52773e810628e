//! The ordinary-integer coefficient ring.

use super::Value;
use num_traits::Zero as NumZero;
use serde::{Deserialize, Serialize};
use std::ops::Neg;

/// A signed-integer ring element (`Z`).
///
/// `magnitude` is the absolute value; the only units are `+1` and `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntegerValue(pub i64);

impl Value for IntegerValue {
    fn zero() -> Self {
        IntegerValue(0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }

    fn add(&self, other: &Self) -> Self {
        IntegerValue(self.0 + other.0)
    }

    fn mul(&self, other: &Self) -> Self {
        IntegerValue(self.0 * other.0)
    }

    fn neg(&self) -> Self {
        IntegerValue(self.0.neg())
    }

    fn magnitude(&self) -> u64 {
        self.0.unsigned_abs()
    }
}

impl From<i64> for IntegerValue {
    fn from(value: i64) -> Self {
        IntegerValue(value)
    }
}

impl std::ops::Add for IntegerValue {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        IntegerValue(self.0 + other.0)
    }
}

impl NumZero for IntegerValue {
    fn zero() -> Self {
        <Self as Value>::zero()
    }

    fn is_zero(&self) -> bool {
        <Self as Value>::is_zero(self)
    }
}
