//! Currency literal values.
//!
//! Accepts the forms people actually type into a search box: an optional
//! `$`, an optional sign, thousands separators and an optional fraction
//! (`$1,234.56`, `-123.01`, `.56`). SQL rendering uses the integer
//! subunit (cents) representation, matching money columns stored as
//! integers.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{QueryError, QueryResult};

/// A parsed currency amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    subunits: i64,
}

impl Money {
    /// Parse a currency string. The `$` prefix and `,` separators are
    /// cosmetic; a bare leading `.` means a zero whole part.
    pub fn parse(text: &str) -> QueryResult<Self> {
        let bad = || QueryError::syntax(format!("invalid money amount {text:?}"));

        let mut cleaned: String = text
            .chars()
            .filter(|c| *c != '$' && *c != ',')
            .collect();
        if let Some(rest) = cleaned.strip_prefix(['-', '+']) {
            if rest.starts_with('.') {
                cleaned = format!("{}0{}", &cleaned[..1], rest);
            }
        } else if cleaned.starts_with('.') {
            cleaned.insert(0, '0');
        }

        let amount = Decimal::from_str(&cleaned).map_err(|_| bad())?;
        let subunits = (amount * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .ok_or_else(bad)?;

        Ok(Self { amount, subunits })
    }

    /// The amount in integer subunits (cents), as rendered into SQL.
    pub fn subunits(&self) -> i64 {
        self.subunits
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_amounts() {
        assert_eq!(Money::parse("123").unwrap().subunits(), 12300);
        assert_eq!(Money::parse("123.00").unwrap().subunits(), 12300);
        assert_eq!(Money::parse("123.45").unwrap().subunits(), 12345);
        assert_eq!(Money::parse("-123.00").unwrap().subunits(), -12300);
    }

    #[test]
    fn test_dollar_sign_and_commas() {
        assert_eq!(Money::parse("$123").unwrap().subunits(), 12300);
        assert_eq!(Money::parse("$-123.00").unwrap().subunits(), -12300);
        assert_eq!(Money::parse("1,234.56").unwrap().subunits(), 123456);
        assert_eq!(Money::parse("$1,234.56").unwrap().subunits(), 123456);
    }

    #[test]
    fn test_bare_fraction() {
        assert_eq!(Money::parse(".56").unwrap().subunits(), 56);
        assert_eq!(Money::parse("-.41").unwrap().subunits(), -41);
        assert_eq!(Money::parse("$.99").unwrap().subunits(), 99);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(Money::parse(",,,").is_err());
        assert!(Money::parse("$").is_err());
    }

    #[test]
    fn test_same_value_compares_equal() {
        assert_eq!(Money::parse("$1,234.56").unwrap(), Money::parse("1234.56").unwrap());
    }
}
