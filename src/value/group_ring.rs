//! The group ring `Z[t]/(t^2-1)`, used for the Frobenius-algebra coefficients
//! of Khovanov homology.
//!
//! An element `a + b*t` is stored as the pair `(a, b)`.  Since `t^2 = 1`,
//! multiplication is
//!
//! ```text
//! (a + b*t)(c + d*t) = (ac + bd) + (ad + bc)*t
//! ```
//!
//! The four elements of magnitude 1 -- `(1,0)`, `(-1,0)`, `(0,1)`, `(0,-1)`
//! -- are exactly the ring units: each squares to `(1,0)`, the multiplicative
//! identity.

use super::Value;
use num_traits::Zero as NumZero;
use serde::{Deserialize, Serialize};

/// An element `a + b*t` of `Z[t]/(t^2-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupRingValue {
    pub a: i64,
    pub b: i64,
}

impl GroupRingValue {
    pub fn new(a: i64, b: i64) -> Self {
        GroupRingValue { a, b }
    }

    /// The element `t` itself (`a=0, b=1`).
    pub fn t() -> Self {
        GroupRingValue { a: 0, b: 1 }
    }
}

impl Value for GroupRingValue {
    fn zero() -> Self {
        GroupRingValue { a: 0, b: 0 }
    }

    fn is_zero(&self) -> bool {
        self.a == 0 && self.b == 0
    }

    fn add(&self, other: &Self) -> Self {
        GroupRingValue {
            a: self.a + other.a,
            b: self.b + other.b,
        }
    }

    fn mul(&self, other: &Self) -> Self {
        GroupRingValue {
            a: self.a * other.a + self.b * other.b,
            b: self.a * other.b + self.b * other.a,
        }
    }

    fn neg(&self) -> Self {
        GroupRingValue { a: -self.a, b: -self.b }
    }

    fn magnitude(&self) -> u64 {
        self.a.unsigned_abs().max(self.b.unsigned_abs())
    }
}

impl std::ops::Add for GroupRingValue {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        GroupRingValue { a: self.a + other.a, b: self.b + other.b }
    }
}

impl NumZero for GroupRingValue {
    fn zero() -> Self {
        <Self as Value>::zero()
    }

    fn is_zero(&self) -> bool {
        <Self as Value>::is_zero(self)
    }
}
