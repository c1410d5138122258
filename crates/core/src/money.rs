use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: '{0}'")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    /// Parse a statement amount such as `-$1,234.56`.
    ///
    /// Currency symbol, thousands separators and inner whitespace are
    /// stripped; the sign is kept.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let clean: String = s
            .chars()
            .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
            .collect();
        if clean.is_empty() {
            return Err(MoneyError::Invalid(s.to_string()));
        }
        Decimal::from_str(&clean)
            .map(Money::from_decimal)
            .map_err(|_| MoneyError::Invalid(s.to_string()))
    }
}

/// Plain two-decimal rendering (`42.10`, `-5.00`), as written to CSV.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain() {
        assert_eq!(Money::parse("123.45").unwrap(), Money::from_cents(12345));
    }

    #[test]
    fn parse_dollar_and_commas() {
        assert_eq!(Money::parse("$1,234.56").unwrap(), Money::from_cents(123456));
    }

    #[test]
    fn parse_keeps_sign() {
        let m = Money::parse("-$42.10").unwrap();
        assert!(m.is_negative());
        assert_eq!(m.abs(), Money::from_cents(4210));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("$").is_err());
        assert!(Money::parse("").is_err());
    }

    #[test]
    fn zero_is_not_negative() {
        let m = Money::parse("-$0.00").unwrap();
        assert!(m.is_zero());
        assert!(!m.is_negative());
    }

    #[test]
    fn display_two_decimals() {
        assert_eq!(Money::from_cents(4210).to_string(), "42.10");
        assert_eq!(Money::from_cents(-500).to_string(), "-5.00");
    }
}
