//! Monetary amounts in minor units.
//!
//! Prices and totals are integers (cents) end to end; nothing in the
//! workflow touches floating point, so totals are exact and comparable.

use serde::{Deserialize, Serialize};

/// A non-negative monetary amount in minor units (cents).
///
/// Serialises as a bare integer.
///
/// # Examples
/// ```
/// use backend::domain::Amount;
///
/// let price = Amount::from_cents(1299).expect("non-negative");
/// let line = price.checked_mul(2).expect("no overflow");
/// assert_eq!(line.cents(), 2598);
/// assert_eq!(line.to_string(), "$25.98");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Amount(i64);

/// Failures raised when constructing or combining amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// The raw value was negative.
    #[error("amount must not be negative, got {0}")]
    Negative(i64),
    /// Arithmetic overflowed the 64-bit minor-unit range.
    #[error("amount arithmetic overflowed")]
    Overflow,
}

impl Amount {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Build an amount from minor units, rejecting negative values.
    pub const fn from_cents(cents: i64) -> Result<Self, AmountError> {
        if cents < 0 {
            return Err(AmountError::Negative(cents));
        }
        Ok(Self(cents))
    }

    /// The raw minor-unit value.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Multiply by a quantity, failing on overflow.
    pub fn checked_mul(self, quantity: u32) -> Result<Self, AmountError> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// Add another amount, failing on overflow.
    pub fn checked_add(self, other: Self) -> Result<Self, AmountError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(AmountError::Overflow)
    }
}

impl std::fmt::Display for Amount {
    /// Render as a dollar string, e.g. `$12.99`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    //! Arithmetic and rendering coverage.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn rejects_negative_values() {
        assert_eq!(Amount::from_cents(-1), Err(AmountError::Negative(-1)));
    }

    #[rstest]
    #[case(0, "$0.00")]
    #[case(5, "$0.05")]
    #[case(1299, "$12.99")]
    #[case(250_000, "$2500.00")]
    fn renders_as_dollars(#[case] cents: i64, #[case] expected: &str) {
        let amount = Amount::from_cents(cents).expect("non-negative");
        assert_eq!(amount.to_string(), expected);
    }

    #[rstest]
    fn multiplication_is_exact() {
        let price = Amount::from_cents(1000).expect("non-negative");
        assert_eq!(price.checked_mul(3).expect("fits").cents(), 3000);
    }

    #[rstest]
    fn multiplication_rejects_overflow() {
        let price = Amount::from_cents(i64::MAX).expect("non-negative");
        assert_eq!(price.checked_mul(2), Err(AmountError::Overflow));
    }

    #[rstest]
    fn addition_rejects_overflow() {
        let huge = Amount::from_cents(i64::MAX).expect("non-negative");
        let one = Amount::from_cents(1).expect("non-negative");
        assert_eq!(huge.checked_add(one), Err(AmountError::Overflow));
    }

    #[rstest]
    fn serialises_transparently() {
        let amount = Amount::from_cents(1299).expect("non-negative");
        assert_eq!(
            serde_json::to_string(&amount).expect("serialises"),
            "1299"
        );
    }
}
