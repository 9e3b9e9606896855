use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::{currency_amount::CurrencyAmount, order_type::OrderType, OrderUid, TradeUid};

/// One execution of (part of) an order, as reported by the exchange.
///
/// Two trades are equal when their business fields match: uid, trade id, type,
/// currency pair, amount, price, fee, user reference and timestamp. The parent
/// order and the audit timestamps are not compared.
///
/// The hash only covers the exchange trade id. Trades sharing a trade id always
/// land in the same bucket even when they differ elsewhere.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Trade {
    pub(crate) uid: Option<TradeUid>,
    pub(crate) trade_id: String,
    pub(crate) trade_type: OrderType,
    pub(crate) order: OrderUid,
    pub(crate) currency_pair: String,
    pub(crate) amount: CurrencyAmount,
    pub(crate) price: CurrencyAmount,
    pub(crate) fee: Option<CurrencyAmount>,
    pub(crate) user_reference: Option<String>,
    pub(crate) timestamp: DateTime<FixedOffset>,
    pub(crate) created_on: Option<DateTime<Utc>>,
    pub(crate) updated_on: Option<DateTime<Utc>>,
}

impl Trade {
    /// A trade that has not been persisted yet
    pub fn new(
        trade_id: impl Into<String>,
        trade_type: OrderType,
        order: OrderUid,
        currency_pair: impl Into<String>,
        amount: CurrencyAmount,
        price: CurrencyAmount,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            uid: None,
            trade_id: trade_id.into(),
            trade_type,
            order,
            currency_pair: currency_pair.into(),
            amount,
            price,
            fee: None,
            user_reference: None,
            timestamp,
            created_on: None,
            updated_on: None,
        }
    }

    pub fn with_fee(mut self, fee: CurrencyAmount) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn with_user_reference(mut self, user_reference: impl Into<String>) -> Self {
        self.user_reference = Some(user_reference.into());
        self
    }

    /// `None` until the trade is stored
    pub fn uid(&self) -> Option<TradeUid> {
        self.uid
    }

    pub fn trade_id(&self) -> &str {
        &self.trade_id
    }

    pub fn trade_type(&self) -> OrderType {
        self.trade_type
    }

    /// Foreign key of the order this trade belongs to
    pub fn order(&self) -> OrderUid {
        self.order
    }

    pub fn currency_pair(&self) -> &str {
        &self.currency_pair
    }

    pub fn amount(&self) -> &CurrencyAmount {
        &self.amount
    }

    pub fn price(&self) -> &CurrencyAmount {
        &self.price
    }

    pub fn fee(&self) -> Option<&CurrencyAmount> {
        self.fee.as_ref()
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

    pub fn set_trade_id(&mut self, trade_id: impl Into<String>) {
        self.trade_id = trade_id.into();
    }

    pub fn set_trade_type(&mut self, trade_type: OrderType) {
        self.trade_type = trade_type;
    }

    pub fn set_order(&mut self, order: OrderUid) {
        self.order = order;
    }

    pub fn set_currency_pair(&mut self, currency_pair: impl Into<String>) {
        self.currency_pair = currency_pair.into();
    }

    pub fn set_amount(&mut self, amount: CurrencyAmount) {
        self.amount = amount;
    }

    pub fn set_price(&mut self, price: CurrencyAmount) {
        self.price = price;
    }

    pub fn set_fee(&mut self, fee: Option<CurrencyAmount>) {
        self.fee = fee;
    }

    pub fn set_user_reference(&mut self, user_reference: Option<String>) {
        self.user_reference = user_reference;
    }

    pub fn set_timestamp(&mut self, timestamp: DateTime<FixedOffset>) {
        self.timestamp = timestamp;
    }

    /// Copies the storage-assigned fields of `stored` into `self`
    pub fn sync_storage_fields(&mut self, stored: &Trade) {
        self.uid = stored.uid;
        self.created_on = stored.created_on;
        self.updated_on = stored.updated_on;
    }
}

impl Eq for Trade {}

impl PartialEq for Trade {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
            && self.trade_id == other.trade_id
            && self.trade_type == other.trade_type
            && self.currency_pair == other.currency_pair
            && self.amount == other.amount
            && self.price == other.price
            && self.fee == other.fee
            && self.user_reference == other.user_reference
            && self.timestamp == other.timestamp
    }
}

impl Hash for Trade {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.trade_id.hash(state);
    }
}

/// Renders an optional field, `null` when absent
pub(crate) struct OrNull<'a, T>(pub(crate) Option<&'a T>);

impl<T: Display> Display for OrNull<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(v) => v.fmt(f),
            None => f.write_str("null"),
        }
    }
}

impl Display for Trade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trade(uid={}, tradeId={}, type={}, order={}, currencyPair={}, amount={}, price={}, \
             fee={}, userReference={}, timestamp={}, createdOn={}, updatedOn={})",
            OrNull(self.uid.as_ref()),
            self.trade_id,
            self.trade_type,
            self.order,
            self.currency_pair,
            self.amount,
            self.price,
            OrNull(self.fee.as_ref()),
            OrNull(self.user_reference.as_ref()),
            self.timestamp.to_rfc3339(),
            OrNull(self.created_on.as_ref()),
            OrNull(self.updated_on.as_ref()),
        )
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::{
        collections::{hash_map::DefaultHasher, HashSet},
        str::FromStr,
    };

    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn hash_of(trade: &Trade) -> u64 {
        let mut hasher = DefaultHasher::new();
        trade.hash(&mut hasher);
        hasher.finish()
    }

    /// T1, BID 1.5 BTC @ 30000 USD, fee 0.01 BTC, ref1, 2024-01-01T00:00:00Z
    pub(crate) fn sample_trade() -> Trade {
        Trade::new(
            "T1",
            OrderType::Bid,
            OrderUid::from(7),
            "BTC/USD",
            CurrencyAmount::new(dec("1.5"), "BTC"),
            CurrencyAmount::new(dec("30000"), "USD"),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().fixed_offset(),
        )
        .with_fee(CurrencyAmount::new(dec("0.01"), "BTC"))
        .with_user_reference("ref1")
    }

    #[test]
    fn equality_is_reflexive_and_symmetric() {
        let a = sample_trade();
        let b = sample_trade();
        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn every_business_field_takes_part_in_equality() {
        let base = sample_trade();
        let mutations: Vec<Box<dyn Fn(&mut Trade)>> = vec![
            Box::new(|t: &mut Trade| t.uid = Some(TradeUid::from(1))),
            Box::new(|t: &mut Trade| t.set_trade_id("T2")),
            Box::new(|t: &mut Trade| t.set_trade_type(OrderType::Ask)),
            Box::new(|t: &mut Trade| t.set_currency_pair("ETH/USD")),
            Box::new(|t: &mut Trade| t.set_amount(CurrencyAmount::new(dec("2"), "BTC"))),
            Box::new(|t: &mut Trade| t.set_price(CurrencyAmount::new(dec("30001"), "USD"))),
            Box::new(|t: &mut Trade| t.set_fee(None)),
            Box::new(|t: &mut Trade| t.set_user_reference(Some("ref2".into()))),
            Box::new(|t: &mut Trade| t.set_timestamp(t.timestamp() + chrono::Duration::seconds(1))),
        ];
        for mutate in mutations {
            let mut other = sample_trade();
            mutate(&mut other);
            assert_ne!(base, other, "{} should differ from {}", other, base);
        }
    }

    #[test]
    fn order_and_audit_fields_are_ignored_by_equality() {
        let base = sample_trade();
        let mut other = sample_trade();
        other.set_order(OrderUid::from(8));
        other.created_on = Some(Utc::now());
        other.updated_on = Some(Utc::now());
        assert_eq!(base, other);
    }

    #[test]
    fn same_trade_id_shares_hash_without_being_equal() {
        let a = sample_trade();
        let mut b = sample_trade();
        b.set_price(CurrencyAmount::new(dec("29999.99"), "USD"));
        assert_ne!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let set: HashSet<Trade> = [a.clone(), b.clone(), a.clone()].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn same_instant_in_another_offset_is_equal() {
        let a = sample_trade();
        let mut b = sample_trade();
        let paris = FixedOffset::east_opt(3600).unwrap();
        b.set_timestamp(a.timestamp().with_timezone(&paris));
        assert_eq!(a, b);
    }

    #[test]
    fn display_renders_every_field() {
        let rendered = sample_trade().to_string();
        for expected in [
            "uid=null",
            "tradeId=T1",
            "type=BID",
            "order=7",
            "currencyPair=BTC/USD",
            "amount=1.5 BTC",
            "price=30000 USD",
            "fee=0.01 BTC",
            "userReference=ref1",
            "timestamp=2024-01-01T00:00:00+00:00",
            "createdOn=null",
            "updatedOn=null",
        ] {
            assert!(rendered.contains(expected), "{expected} missing in {rendered}");
        }
    }

    #[test]
    fn sync_storage_fields_copies_uid_and_audit() {
        let mut local = sample_trade();
        let mut stored = sample_trade();
        stored.uid = Some(TradeUid::from(3));
        stored.created_on = Some(Utc::now());
        local.sync_storage_fields(&stored);
        assert_eq!(local.uid(), Some(TradeUid::from(3)));
        assert_eq!(local.created_on(), stored.created_on());
        assert_eq!(local, stored);
    }

    #[test]
    fn serde_keeps_business_fields() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        assert!(json.contains("\"trade_type\":\"BID\""));
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trade);
    }
}
