use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::{currency_amount::CurrencyAmount, order_type::OrderType, trade::OrNull, OrderUid};

/// Order placed on an exchange. Trades reference it through its uid
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Order {
    pub(crate) uid: Option<OrderUid>,
    pub(crate) order_id: String,
    pub(crate) order_type: OrderType,
    pub(crate) currency_pair: String,
    pub(crate) amount: CurrencyAmount,
    pub(crate) limit_price: Option<CurrencyAmount>, // None for market orders
    pub(crate) user_reference: Option<String>,
    pub(crate) timestamp: DateTime<FixedOffset>,
    pub(crate) created_on: Option<DateTime<Utc>>,
    pub(crate) updated_on: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(
        order_id: impl Into<String>,
        order_type: OrderType,
        currency_pair: impl Into<String>,
        amount: CurrencyAmount,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            uid: None,
            order_id: order_id.into(),
            order_type,
            currency_pair: currency_pair.into(),
            amount,
            limit_price: None,
            user_reference: None,
            timestamp,
            created_on: None,
            updated_on: None,
        }
    }

    pub fn with_limit_price(mut self, limit_price: CurrencyAmount) -> Self {
        self.limit_price = Some(limit_price);
        self
    }

    pub fn with_user_reference(mut self, user_reference: impl Into<String>) -> Self {
        self.user_reference = Some(user_reference.into());
        self
    }

    pub fn uid(&self) -> Option<OrderUid> {
        self.uid
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn currency_pair(&self) -> &str {
        &self.currency_pair
    }

    pub fn amount(&self) -> &CurrencyAmount {
        &self.amount
    }

    pub fn limit_price(&self) -> Option<&CurrencyAmount> {
        self.limit_price.as_ref()
    }

    pub fn user_reference(&self) -> Option<&str> {
        self.user_reference.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn created_on(&self) -> Option<DateTime<Utc>> {
        self.created_on
    }

    pub fn updated_on(&self) -> Option<DateTime<Utc>> {
        self.updated_on
    }

    pub fn set_order_id(&mut self, order_id: impl Into<String>) {
        self.order_id = order_id.into();
    }

    pub fn set_order_type(&mut self, order_type: OrderType) {
        self.order_type = order_type;
    }

    pub fn set_currency_pair(&mut self, currency_pair: impl Into<String>) {
        self.currency_pair = currency_pair.into();
    }

    pub fn set_amount(&mut self, amount: CurrencyAmount) {
        self.amount = amount;
    }

    pub fn set_limit_price(&mut self, limit_price: Option<CurrencyAmount>) {
        self.limit_price = limit_price;
    }

    pub fn set_user_reference(&mut self, user_reference: Option<String>) {
        self.user_reference = user_reference;
    }

    pub fn set_timestamp(&mut self, timestamp: DateTime<FixedOffset>) {
        self.timestamp = timestamp;
    }
}

impl Eq for Order {}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
            && self.order_id == other.order_id
            && self.order_type == other.order_type
            && self.currency_pair == other.currency_pair
            && self.amount == other.amount
            && self.limit_price == other.limit_price
            && self.user_reference == other.user_reference
            && self.timestamp == other.timestamp
    }
}

impl Hash for Order {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order_id.hash(state);
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order(uid={}, orderId={}, type={}, currencyPair={}, amount={}, limitPrice={}, \
             userReference={}, timestamp={}, createdOn={}, updatedOn={})",
            OrNull(self.uid.as_ref()),
            self.order_id,
            self.order_type,
            self.currency_pair,
            self.amount,
            OrNull(self.limit_price.as_ref()),
            OrNull(self.user_reference.as_ref()),
            self.timestamp.to_rfc3339(),
            OrNull(self.created_on.as_ref()),
            OrNull(self.updated_on.as_ref()),
        )
    }
}
