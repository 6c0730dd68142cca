//! Money in integer minor units (cents)
//!
//! Coin values, bets and payouts are all `Money`. Settlement sums are exact
//! because nothing is accumulated in floating point; conversion from a
//! fractional multiple rounds to the nearest minor unit once.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Minor units per major unit
pub const MINOR_PER_MAJOR: i64 = 100;

/// Signed amount in minor units
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);
    /// Smallest representable positive amount
    pub const MINOR_UNIT: Money = Money(1);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    /// From a major-unit amount, rounded to the nearest minor unit
    pub fn from_major(amount: f64) -> Self {
        Self((amount * MINOR_PER_MAJOR as f64).round() as i64)
    }

    pub fn to_major(self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR as f64
    }

    /// Multiply by a fractional factor, rounding to the nearest minor unit
    pub fn scale(self, factor: f64) -> Self {
        Self((self.0 as f64 * factor).round() as i64)
    }

    /// Multiply by a whole factor
    pub fn times(self, factor: u32) -> Self {
        Self(self.0.saturating_mul(factor as i64))
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Ratio to another amount (0 when `other` is zero)
    pub fn ratio_to(self, other: Money) -> f64 {
        if other.0 == 0 {
            0.0
        } else {
            self.0 as f64 / other.0 as f64
        }
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}{}.{:02}",
            sign,
            abs / MINOR_PER_MAJOR as u64,
            abs % MINOR_PER_MAJOR as u64
        )
    }
}
