use std::{fmt::Display, str::FromStr};

use diesel::{sql_types::Text, AsExpression};
use serde::{Deserialize, Serialize};
use tradelog_errors::TradelogError;

/// Side of an order or of a trade. Persisted by its symbolic name.
/// Rows are read back as text and parsed with `FromStr`
#[derive(
    Debug,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Clone,
    Copy,
    Hash,
    AsExpression,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Buy
    Bid,
    /// Sell
    Ask,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Bid => "BID",
            OrderType::Ask => "ASK",
        }
    }
}

impl Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = TradelogError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BID" => Ok(OrderType::Bid),
            "ASK" => Ok(OrderType::Ask),
            _ => Err(TradelogError::InvalidData(format!(
                "{s} is not a valid order type"
            ))),
        }
    }
}

impl<DB> diesel::serialize::ToSql<Text, DB> for OrderType
where
    DB: diesel::backend::Backend,
    str: diesel::serialize::ToSql<Text, DB>,
{
    fn to_sql<'b>(
        &'b self,
        out: &mut diesel::serialize::Output<'b, '_, DB>,
    ) -> diesel::serialize::Result {
        <str as diesel::serialize::ToSql<Text, DB>>::to_sql(self.as_str(), out)
    }
}
