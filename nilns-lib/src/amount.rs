//! Token amounts and fee shapes.
//!
//! Payment amounts are entered in display units (NIL) and converted to base
//! units (unil) by flooring, matching what the chain accepts. A positive
//! amount that floors to zero base units is rejected before any wallet
//! interaction.

use serde::{Deserialize, Serialize};

use crate::{NilnsError, Result};

/// Base units per display unit: 1 NIL = 1_000_000 unil.
pub const BASE_UNITS_PER_NIL: u64 = 1_000_000;

/// Smallest payable amount in display units.
pub const MIN_PAYMENT_NIL: &str = "0.000001";

/// A denominated amount in base units, e.g. `2000unil`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    /// Amount in base units
    pub amount: u64,
    /// Base denomination (e.g. "unil")
    pub denom: String,
}

impl Coin {
    /// Create a new coin.
    pub fn new(amount: u64, denom: impl Into<String>) -> Self {
        Self {
            amount,
            denom: denom.into(),
        }
    }
}

impl std::fmt::Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Flat transaction fee: a single coin plus a gas budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    /// Fee paid to the chain
    pub amount: Coin,
    /// Gas budget for execution
    pub gas: u64,
}

impl Fee {
    /// Create a new fee.
    pub fn new(amount: Coin, gas: u64) -> Self {
        Self { amount, gas }
    }
}

/// A user-entered payment amount in display units (NIL).
///
/// Parsing accepts any positive finite decimal; conversion to base units
/// floors, exactly as the original client did, so sub-unit remainders are
/// dropped rather than rounded up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NilAmount(f64);

impl NilAmount {
    /// Parse a display-unit amount from user input.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| NilnsError::invalid_input("amount", "not a number"))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(NilnsError::invalid_input(
                "amount",
                "must be a positive number",
            ));
        }
        Ok(Self(value))
    }

    /// The amount in display units.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Convert to base units via `floor(value * 1_000_000)`.
    ///
    /// Fails with `AmountTooSmall` when the floor is zero, so a doomed
    /// transaction never reaches the wallet, and with `InvalidInput`
    /// when the product exceeds the base-unit range.
    pub fn base_units(&self) -> Result<u64> {
        let units = (self.0 * BASE_UNITS_PER_NIL as f64).floor();
        if units < 1.0 {
            return Err(NilnsError::AmountTooSmall {
                amount: self.0.to_string(),
                minimum: MIN_PAYMENT_NIL.to_string(),
            });
        }
        // f64 to u64 casts saturate at u64::MAX.
        if units >= u64::MAX as f64 {
            return Err(NilnsError::invalid_input(
                "amount",
                "exceeds the largest payable amount",
            ));
        }
        Ok(units as u64)
    }

    /// Convert to a denominated coin in base units.
    pub fn to_coin(&self, denom: impl Into<String>) -> Result<Coin> {
        Ok(Coin::new(self.base_units()?, denom))
    }
}

impl std::fmt::Display for NilAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} NIL", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NilnsErrorCode;

    #[test]
    fn test_parse_and_convert() {
        let amount = NilAmount::parse("0.5").unwrap();
        assert_eq!(amount.base_units().unwrap(), 500_000);

        let amount = NilAmount::parse("1").unwrap();
        assert_eq!(amount.base_units().unwrap(), 1_000_000);
    }

    #[test]
    fn test_minimum_amount_converts_to_one_unit() {
        let amount = NilAmount::parse("0.000001").unwrap();
        assert_eq!(amount.base_units().unwrap(), 1);
    }

    #[test]
    fn test_conversion_floors() {
        let amount = NilAmount::parse("1.9999999").unwrap();
        assert_eq!(amount.base_units().unwrap(), 1_999_999);
    }

    #[test]
    fn test_sub_unit_amount_rejected() {
        let amount = NilAmount::parse("0.0000001").unwrap();
        let err = amount.base_units().unwrap_err();
        assert_eq!(err.code(), NilnsErrorCode::AmountTooSmall);
        assert!(err.to_string().contains(MIN_PAYMENT_NIL));
    }

    #[test]
    fn test_oversized_amount_rejected() {
        // 1e14 NIL floors to 1e20 unil, past what a u64 coin can carry.
        let amount = NilAmount::parse("100000000000000").unwrap();
        let err = amount.base_units().unwrap_err();
        assert_eq!(err.code(), NilnsErrorCode::InvalidInput);

        // Large in-range amounts still convert.
        let amount = NilAmount::parse("10000000000000").unwrap();
        assert_eq!(amount.base_units().unwrap(), 10_000_000_000_000_000_000);
    }

    #[test]
    fn test_rejects_non_numeric_input() {
        assert!(NilAmount::parse("").is_err());
        assert!(NilAmount::parse("abc").is_err());
        assert!(NilAmount::parse("1.2.3").is_err());
    }

    #[test]
    fn test_rejects_non_positive_input() {
        assert!(NilAmount::parse("0").is_err());
        assert!(NilAmount::parse("-1").is_err());
        assert!(NilAmount::parse("NaN").is_err());
        assert!(NilAmount::parse("inf").is_err());
    }

    #[test]
    fn test_coin_display() {
        let coin = Coin::new(2000, "unil");
        assert_eq!(coin.to_string(), "2000unil");
    }

    #[test]
    fn test_to_coin() {
        let coin = NilAmount::parse("0.25").unwrap().to_coin("unil").unwrap();
        assert_eq!(coin, Coin::new(250_000, "unil"));
    }
}
