//! Positive monetary amount using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Error returned for an amount the `NUMERIC(12, 2)` column cannot hold.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    #[error("El monto debe ser mayor a cero")]
    NotPositive,

    #[error("El monto debe ser menor a 10000000000")]
    TooLarge,

    #[error("El monto admite como máximo 2 decimales")]
    TooManyDecimals,
}

/// A strictly positive payment amount in Chilean pesos.
///
/// Backed by [`Decimal`] so amounts round-trip through `NUMERIC` columns
/// without floating-point drift.
///
/// ```
/// use ferremas_core::Amount;
/// use rust_decimal::Decimal;
///
/// assert!(Amount::new(Decimal::new(15990, 0)).is_ok());
/// assert!(Amount::new(Decimal::ZERO).is_err());
/// assert!(Amount::new(Decimal::new(1999, 3)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Decimal places stored by the column.
    pub const MAX_SCALE: u32 = 2;

    /// Exclusive upper bound: ten integer digits.
    pub const UPPER_BOUND: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

    /// Create an amount.
    ///
    /// Trailing zeros do not count as decimals, so `10.500` is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::NotPositive`] when `value <= 0`,
    /// [`AmountError::TooLarge`] from [`Self::UPPER_BOUND`] up and
    /// [`AmountError::TooManyDecimals`] beyond [`Self::MAX_SCALE`] places.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive);
        }
        if value >= Self::UPPER_BOUND {
            return Err(AmountError::TooLarge);
        }
        if value.normalize().scale() > Self::MAX_SCALE {
            return Err(AmountError::TooManyDecimals);
        }
        Ok(Self(value))
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_and_negative() {
        assert_eq!(Amount::new(Decimal::ZERO), Err(AmountError::NotPositive));
        assert_eq!(Amount::new(Decimal::new(-1, 2)), Err(AmountError::NotPositive));
    }

    #[test]
    fn test_upper_bound_is_ten_integer_digits() {
        assert_eq!(Amount::UPPER_BOUND, Decimal::new(10_000_000_000, 0));
        assert_eq!(
            Amount::new(Decimal::new(9_999_999_999_99, 2)).map(|a| a.value()),
            Ok(Decimal::new(9_999_999_999_99, 2))
        );
        assert_eq!(
            Amount::new(Decimal::new(10_000_000_000, 0)),
            Err(AmountError::TooLarge)
        );
        assert_eq!(
            Amount::new(Decimal::new(99_999_999_999_99, 2)),
            Err(AmountError::TooLarge)
        );
    }

    #[test]
    fn test_scale_beyond_cents_is_rejected() {
        assert_eq!(
            Amount::new(Decimal::new(1_999, 3)),
            Err(AmountError::TooManyDecimals)
        );
        assert!(Amount::new(Decimal::new(10_500, 3)).is_ok());
    }

    #[test]
    fn test_new_accepts_fractional_positive() {
        let amount = Amount::new(Decimal::new(1, 2));
        assert_eq!(amount.map(|a| a.value()), Ok(Decimal::new(1, 2)));
    }
}
