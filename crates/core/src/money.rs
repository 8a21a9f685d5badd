//! Exact price representation.
//!
//! Prices are kept as an unsigned count of minor currency units (cents), so
//! comparisons, price bands, and distance calculations never touch floating point.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// A non-negative price in minor units.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl ValueObject for Price {}

impl Price {
    pub const ZERO: Price = Price(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Absolute distance between two prices, in cents.
    pub fn abs_diff(self, other: Price) -> u64 {
        self.0.abs_diff(other.0)
    }
}

impl core::fmt::Display for Price {
    /// Fixed two-decimal rendering (`1999` cents → `"19.99"`).
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Price {
    type Err = DomainError;

    /// Parse a plain decimal string. Fractions beyond two digits are rounded half-up.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || DomainError::validation(format!("invalid price: {s:?}"));

        if s.starts_with('-') {
            return Err(DomainError::validation(format!("price must not be negative: {s:?}")));
        }

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        let digits: Vec<u64> = frac.bytes().map(|b| u64::from(b - b'0')).collect();
        let tenths = digits.first().copied().unwrap_or(0);
        let hundredths = digits.get(1).copied().unwrap_or(0);
        let round_up = digits.get(2).is_some_and(|d| *d >= 5);

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + u64::from(round_up)))
            .map(Price)
            .ok_or_else(invalid)
    }
}
