//! Exact money amounts.
//!
//! Wraps `rust_decimal` so amounts never pass through binary floating point.
//! Every value carries at least two fractional digits (cents); extra digits
//! from the source are kept, never rounded away.

use crate::error::{LedgerError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

/// A signed, exact money amount. Negative values are debits.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use statement_ledger::Money;
///
/// let amount = Money::from_str("-38500").unwrap();
/// assert_eq!(amount.to_string(), "-38500.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    /// Minimum number of fractional digits carried.
    pub const SCALE: u32 = 2;

    /// Zero value, `0.00`.
    pub const ZERO: Self = Money(Decimal::from_parts(0, 0, 0, false, Self::SCALE));

    /// Creates a `Money` from a `Decimal`, padding the scale up to cents.
    pub fn new(value: Decimal) -> Self {
        let mut normalized = value;
        if normalized.scale() < Self::SCALE {
            normalized.rescale(Self::SCALE);
        }
        Money(normalized)
    }

    /// Builds an amount from whole minor units (cents).
    pub fn from_minor_units(cents: i64) -> Self {
        Money(Decimal::new(cents, Self::SCALE))
    }

    /// Converts to whole minor units (cents).
    ///
    /// Fails with [`LedgerError::InexactAmount`] instead of rounding when the
    /// amount has sub-cent digits or does not fit in an `i64`.
    pub fn to_minor_units(&self) -> Result<i64> {
        let cents = self
            .0
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(LedgerError::InexactAmount(self.0))?;
        if !cents.fract().is_zero() {
            return Err(LedgerError::InexactAmount(self.0));
        }
        cents.to_i64().ok_or(LedgerError::InexactAmount(self.0))
    }

    /// Returns the underlying decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` for debits.
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Adds two amounts, returning `None` if the sum leaves the range of
    /// `Decimal`.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Money::new)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::ZERO
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money::new(value)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    /// Parses a canonical decimal literal (`.` as the decimal point).
    ///
    /// Literals with more fractional digits than `Decimal` can hold are
    /// rejected rather than rounded.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let decimal = Decimal::from_str_exact(s.trim())?;
        Ok(Money::new(decimal))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad so `{:>9}` right-justifies like a string
        f.pad(&self.0.to_string())
    }
}

/// Panics on overflow. Use [`Money::checked_add`] for sums of parsed input.
impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money::new(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money::new(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        // subtract from zero so negating 0.00 never yields -0.00
        Money::new(Decimal::ZERO - self.0)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_pads_scale_to_cents() {
        assert_eq!(Money::new(dec!(1)).to_string(), "1.00");
        assert_eq!(Money::new(dec!(1.5)).to_string(), "1.50");
        assert_eq!(Money::new(dec!(-38500)).to_string(), "-38500.00");
    }

    #[test]
    fn test_new_keeps_extra_digits() {
        assert_eq!(Money::new(dec!(0.125)).to_string(), "0.125");
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let a = Money::from_str("0.10").unwrap();
        let b = Money::from_str("0.20").unwrap();

        assert_eq!(a + b, Money::from_str("0.30").unwrap());
        assert_eq!((b - a).to_string(), "0.10");
        assert_eq!((-a).to_string(), "-0.10");
    }

    #[test]
    fn test_sum_of_many_cents() {
        let cent = Money::from_str("0.01").unwrap();
        let cents = (0..1000).try_fold(Money::ZERO, |acc, _| acc.checked_add(cent));
        assert_eq!(cents.unwrap().to_string(), "10.00");
    }

    #[test]
    fn test_checked_add_reports_overflow() {
        let max = Money::new(Decimal::MAX);
        assert_eq!(max.checked_add(max), None);
        assert_eq!(max.checked_add(-max), Some(Money::ZERO));
    }

    #[test]
    fn test_from_str_rejects_digits_beyond_precision() {
        assert!(Money::from_str("0.12345678901234567890123456789012").is_err());
        assert!(Money::from_str("79228162514264337593543950336").is_err());

        let widest = Money::from_str("0.1234567890123456789012345678").unwrap();
        assert_eq!(widest.to_string(), "0.1234567890123456789012345678");
    }

    #[test]
    fn test_display_honors_width() {
        let amount = Money::from_str("-497.78").unwrap();
        assert_eq!(format!("{:>9}", amount), "  -497.78");
    }

    #[test]
    fn test_minor_units_round_trip() {
        let amount = Money::from_str("-38500.00").unwrap();
        let cents = amount.to_minor_units().unwrap();
        assert_eq!(cents, -3_850_000);
        assert_eq!(Money::from_minor_units(cents), amount);
        assert_eq!(Money::from_minor_units(cents).to_string(), "-38500.00");
    }

    #[test]
    fn test_minor_units_rejects_sub_cent_values() {
        let amount = Money::from_str("0.125").unwrap();
        assert!(matches!(
            amount.to_minor_units(),
            Err(LedgerError::InexactAmount(_))
        ));
    }

    #[test]
    fn test_sign() {
        assert!(Money::from_str("-0.01").unwrap().is_negative());
        assert!(!Money::ZERO.is_negative());
        assert!(Money::ZERO.is_zero());
        assert_eq!(Money::ZERO.to_string(), "0.00");
        assert_eq!((-Money::ZERO).to_string(), "0.00");
    }
}
