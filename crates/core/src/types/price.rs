//! Type-safe price representation using decimal arithmetic.
//!
//! All marketplace prices are Tanzanian shilling amounts. Shillings have no
//! minor unit in everyday campus trade, so prices display as whole amounts
//! with thousands separators (e.g. `12,500 TSh`).

use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A marketplace price in Tanzanian shillings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// A zero price.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Create a price from a whole shilling amount.
    #[must_use]
    pub fn from_shillings(amount: i64) -> Self {
        Self(Decimal::new(amount, 0))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply the price by a quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display with thousands separators (e.g. `12,500 TSh`).
    #[must_use]
    pub fn display(&self) -> String {
        let normalized = self.0.normalize();
        let raw = normalized.to_string();
        let (integer, fraction) = raw.split_once('.').unwrap_or((raw.as_str(), ""));
        let (sign, digits) = integer
            .strip_prefix('-')
            .map_or(("", integer), |rest| ("-", rest));

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        if fraction.is_empty() {
            format!("{sign}{grouped} TSh")
        } else {
            format!("{sign}{grouped}.{fraction} TSh")
        }
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        self.times(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
