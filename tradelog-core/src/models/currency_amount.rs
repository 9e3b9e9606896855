use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tradelog_errors::TradelogError;

/// A decimal value expressed in a currency, e.g. `1.5 BTC`.
///
/// Stored as two columns, `<prefix>_value` and `<prefix>_currency`.
/// Values compare numerically: `1.5 BTC == 1.50 BTC`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyAmount {
    pub value: Decimal,
    pub currency: String,
}

impl CurrencyAmount {
    pub fn new(value: Decimal, currency: impl Into<String>) -> Self {
        Self {
            value,
            currency: currency.into(),
        }
    }

    /// Rebuilds an optional amount from its two columns.
    /// Both null is an absent amount, a single null is a corrupt row.
    pub(crate) fn from_columns(
        column: &str,
        value: Option<Decimal>,
        currency: Option<String>,
    ) -> Result<Option<Self>, TradelogError> {
        match (value, currency) {
            (Some(value), Some(currency)) => Ok(Some(Self { value, currency })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(TradelogError::InvalidData(format!(
                "{column}_currency is null while {column}_value is set"
            ))),
            (None, Some(_)) => Err(TradelogError::InvalidData(format!(
                "{column}_value is null while {column}_currency is set"
            ))),
        }
    }

    /// Same as [`CurrencyAmount::from_columns`] for a mandatory amount
    pub(crate) fn required_from_columns(
        column: &str,
        value: Option<Decimal>,
        currency: Option<String>,
    ) -> Result<Self, TradelogError> {
        Self::from_columns(column, value, currency)?
            .ok_or_else(|| TradelogError::InvalidData(format!("{column} is null")))
    }

    pub(crate) fn into_columns(amount: Option<&Self>) -> (Option<Decimal>, Option<String>) {
        match amount {
            Some(amount) => (Some(amount.value), Some(amount.currency.clone())),
            None => (None, None),
        }
    }
}

impl Display for CurrencyAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn compares_values_numerically() {
        let a = CurrencyAmount::new(Decimal::from_str("1.5").unwrap(), "BTC");
        let b = CurrencyAmount::new(Decimal::from_str("1.50").unwrap(), "BTC");
        assert_eq!(a, b);
        assert_ne!(a, CurrencyAmount::new(Decimal::from_str("1.5").unwrap(), "ETH"));
    }

    #[test]
    fn renders_value_then_currency() {
        let fee = CurrencyAmount::new(Decimal::from_str("0.01").unwrap(), "BTC");
        assert_eq!(fee.to_string(), "0.01 BTC");
    }

    #[test]
    fn half_null_columns_are_rejected() {
        let err = CurrencyAmount::from_columns("fee", Some(Decimal::ONE), None).unwrap_err();
        assert!(err.to_string().contains("fee_currency"));
        let err = CurrencyAmount::from_columns("fee", None, Some("BTC".into())).unwrap_err();
        assert!(err.to_string().contains("fee_value"));
    }

    #[test]
    fn null_columns_are_absent_or_rejected_when_required() {
        assert_eq!(CurrencyAmount::from_columns("fee", None, None).unwrap(), None);
        let err = CurrencyAmount::required_from_columns("price", None, None).unwrap_err();
        assert!(matches!(err, TradelogError::InvalidData(_)));
    }
}
