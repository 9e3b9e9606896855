use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use tradelog_errors::TradelogError;

use crate::prelude::{CurrencyAmount, Order, OrderType, OrderUid, Trade, TradeUid};

/// Rejects a null column that the record requires
fn required<T>(column: &str, value: Option<T>) -> Result<T, TradelogError> {
    value.ok_or_else(|| TradelogError::InvalidData(format!("{column} is null")))
}

/// Parses the TYPE column. Only the exact symbolic names are accepted
fn order_type(value: Option<String>) -> Result<OrderType, TradelogError> {
    required("type", value)?.parse::<OrderType>().map_err(|e| match e {
        TradelogError::InvalidData(msg) => TradelogError::InvalidData(format!("type: {msg}")),
        other => other,
    })
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = super::schema::trades)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbTrade {
    pub uid: TradeUid,
    pub trade_id: Option<String>,
    pub trade_type: Option<String>,
    pub fk_order_uid: OrderUid,
    pub currency_pair: Option<String>,
    pub amount_value: Option<Decimal>,
    pub amount_currency: Option<String>,
    pub price_value: Option<Decimal>,
    pub price_currency: Option<String>,
    pub fee_value: Option<Decimal>,
    pub fee_currency: Option<String>,
    pub user_reference: Option<String>,
    pub timestamp: Option<DateTime<Utc>>, // Diesel automatically handles time-zone conversions
    pub created_on: DateTime<Utc>,
    pub updated_on: Option<DateTime<Utc>>,
}

/// Every column of `trades` a caller may write. Used for inserts and updates
#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = super::schema::trades)]
#[diesel(treat_none_as_null = true)]
pub struct NewDbTrade {
    pub trade_id: String,
    pub trade_type: OrderType,
    pub fk_order_uid: OrderUid,
    pub currency_pair: String,
    pub amount_value: Decimal,
    pub amount_currency: String,
    pub price_value: Decimal,
    pub price_currency: String,
    pub fee_value: Option<Decimal>,
    pub fee_currency: Option<String>,
    pub user_reference: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<&Trade> for NewDbTrade {
    fn from(t: &Trade) -> Self {
        let (fee_value, fee_currency) = CurrencyAmount::into_columns(t.fee.as_ref());
        Self {
            trade_id: t.trade_id.clone(),
            trade_type: t.trade_type,
            fk_order_uid: t.order,
            currency_pair: t.currency_pair.clone(),
            amount_value: t.amount.value,
            amount_currency: t.amount.currency.clone(),
            price_value: t.price.value,
            price_currency: t.price.currency.clone(),
            fee_value,
            fee_currency,
            user_reference: t.user_reference.clone(),
            timestamp: t.timestamp.with_timezone(&Utc),
        }
    }
}

impl TryFrom<DbTrade> for Trade {
    type Error = TradelogError;

    fn try_from(row: DbTrade) -> Result<Self, Self::Error> {
        let uid = row.uid;
        trade_from_row(row).map_err(|e| {
            log::warn!("Rejecting trade row {}: {}", uid, e);
            match e {
                TradelogError::InvalidData(msg) => {
                    TradelogError::InvalidData(format!("trade {}: {}", uid, msg))
                }
                other => other,
            }
        })
    }
}

fn trade_from_row(row: DbTrade) -> Result<Trade, TradelogError> {
    Ok(Trade {
        uid: Some(row.uid),
        trade_id: required("trade_id", row.trade_id)?,
        trade_type: order_type(row.trade_type)?,
        order: row.fk_order_uid,
        currency_pair: required("currency_pair", row.currency_pair)?,
        amount: CurrencyAmount::required_from_columns(
            "amount",
            row.amount_value,
            row.amount_currency,
        )?,
        price: CurrencyAmount::required_from_columns(
            "price",
            row.price_value,
            row.price_currency,
        )?,
        fee: CurrencyAmount::from_columns("fee", row.fee_value, row.fee_currency)?,
        user_reference: row.user_reference,
        timestamp: required("timestamp", row.timestamp)?.fixed_offset(),
        created_on: Some(row.created_on),
        updated_on: row.updated_on,
    })
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = super::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbOrder {
    pub uid: OrderUid,
    pub order_id: Option<String>,
    pub order_type: Option<String>,
    pub currency_pair: Option<String>,
    pub amount_value: Option<Decimal>,
    pub amount_currency: Option<String>,
    pub limit_price_value: Option<Decimal>,
    pub limit_price_currency: Option<String>,
    pub user_reference: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub created_on: DateTime<Utc>,
    pub updated_on: Option<DateTime<Utc>>,
}

#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = super::schema::orders)]
#[diesel(treat_none_as_null = true)]
pub struct NewDbOrder {
    pub order_id: String,
    pub order_type: OrderType,
    pub currency_pair: String,
    pub amount_value: Decimal,
    pub amount_currency: String,
    pub limit_price_value: Option<Decimal>,
    pub limit_price_currency: Option<String>,
    pub user_reference: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<&Order> for NewDbOrder {
    fn from(o: &Order) -> Self {
        let (limit_price_value, limit_price_currency) =
            CurrencyAmount::into_columns(o.limit_price.as_ref());
        Self {
            order_id: o.order_id.clone(),
            order_type: o.order_type,
            currency_pair: o.currency_pair.clone(),
            amount_value: o.amount.value,
            amount_currency: o.amount.currency.clone(),
            limit_price_value,
            limit_price_currency,
            user_reference: o.user_reference.clone(),
            timestamp: o.timestamp.with_timezone(&Utc),
        }
    }
}

impl TryFrom<DbOrder> for Order {
    type Error = TradelogError;

    fn try_from(row: DbOrder) -> Result<Self, Self::Error> {
        let uid = row.uid;
        order_from_row(row).map_err(|e| {
            log::warn!("Rejecting order row {}: {}", uid, e);
            match e {
                TradelogError::InvalidData(msg) => {
                    TradelogError::InvalidData(format!("order {}: {}", uid, msg))
                }
                other => other,
            }
        })
    }
}

fn order_from_row(row: DbOrder) -> Result<Order, TradelogError> {
    Ok(Order {
        uid: Some(row.uid),
        order_id: required("order_id", row.order_id)?,
        order_type: order_type(row.order_type)?,
        currency_pair: required("currency_pair", row.currency_pair)?,
        amount: CurrencyAmount::required_from_columns(
            "amount",
            row.amount_value,
            row.amount_currency,
        )?,
        limit_price: CurrencyAmount::from_columns(
            "limit_price",
            row.limit_price_value,
            row.limit_price_currency,
        )?,
        user_reference: row.user_reference,
        timestamp: required("timestamp", row.timestamp)?.fixed_offset(),
        created_on: Some(row.created_on),
        updated_on: row.updated_on,
    })
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;
    use crate::models::{order::test::sample_order, trade::test::sample_trade};

    /// What the database would hand back after inserting `row`
    fn stored_trade(row: NewDbTrade, uid: i64) -> DbTrade {
        DbTrade {
            uid: TradeUid::from(uid),
            trade_id: Some(row.trade_id),
            trade_type: Some(row.trade_type.to_string()),
            fk_order_uid: row.fk_order_uid,
            currency_pair: Some(row.currency_pair),
            amount_value: Some(row.amount_value),
            amount_currency: Some(row.amount_currency),
            price_value: Some(row.price_value),
            price_currency: Some(row.price_currency),
            fee_value: row.fee_value,
            fee_currency: row.fee_currency,
            user_reference: row.user_reference,
            timestamp: Some(row.timestamp),
            created_on: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            updated_on: None,
        }
    }

    #[test]
    fn trade_survives_row_translation() {
        let mut trade = sample_trade();
        let back = Trade::try_from(stored_trade(NewDbTrade::from(&trade), 11)).unwrap();

        assert_eq!(back.uid(), Some(TradeUid::from(11)));
        assert_eq!(back.order(), trade.order());
        assert!(back.created_on().is_some());

        // Only the storage-assigned uid told them apart
        assert_ne!(back, trade);
        trade.sync_storage_fields(&back);
        assert_eq!(back, trade);
        assert_eq!(back.to_string(), trade.to_string());
    }

    #[test]
    fn timestamp_is_stored_in_utc() {
        let mut trade = sample_trade();
        let tokyo = chrono::FixedOffset::east_opt(9 * 3600).unwrap();
        trade.set_timestamp(trade.timestamp().with_timezone(&tokyo));

        let row = NewDbTrade::from(&trade);
        assert_eq!(row.timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let back = Trade::try_from(stored_trade(row, 1)).unwrap();
        assert_eq!(back.timestamp(), trade.timestamp());
    }

    #[test]
    fn missing_fee_is_stored_as_two_nulls() {
        let mut trade = sample_trade();
        trade.set_fee(None);
        let row = NewDbTrade::from(&trade);
        assert_eq!((row.fee_value, row.fee_currency.as_deref()), (None, None));
        assert_eq!(Trade::try_from(stored_trade(row, 2)).unwrap().fee(), None);
    }

    #[test]
    fn null_required_columns_are_rejected() {
        let mut row = stored_trade(NewDbTrade::from(&sample_trade()), 5);
        row.trade_type = None;
        let err = Trade::try_from(row).unwrap_err();
        assert_eq!(err.to_string(), "Invalid Data: trade 5: type is null");

        let mut row = stored_trade(NewDbTrade::from(&sample_trade()), 6);
        row.price_currency = None;
        let err = Trade::try_from(row).unwrap_err();
        assert!(err.to_string().contains("price_currency"));
    }

    #[test]
    fn unknown_type_names_are_rejected() {
        for name in ["bid", " ASK ", "SELL"] {
            let mut row = stored_trade(NewDbTrade::from(&sample_trade()), 8);
            row.trade_type = Some(name.to_string());
            let err = Trade::try_from(row).unwrap_err();
            assert!(matches!(err, TradelogError::InvalidData(_)), "{name}");
            assert!(err.to_string().starts_with("Invalid Data: trade 8: type: "));
        }

        let mut row = stored_trade(NewDbTrade::from(&sample_trade()), 9);
        row.trade_type = Some("ASK".to_string());
        assert_eq!(Trade::try_from(row).unwrap().trade_type(), OrderType::Ask);
    }

    #[test]
    fn half_null_fee_is_rejected() {
        let mut row = stored_trade(NewDbTrade::from(&sample_trade()), 7);
        row.fee_currency = None;
        assert!(matches!(
            Trade::try_from(row),
            Err(TradelogError::InvalidData(_))
        ));
    }

    #[test]
    fn order_survives_row_translation() {
        let order = sample_order();
        let row = NewDbOrder::from(&order);
        let back = Order::try_from(DbOrder {
            uid: OrderUid::from(3),
            order_id: Some(row.order_id),
            order_type: Some(row.order_type.to_string()),
            currency_pair: Some(row.currency_pair),
            amount_value: Some(row.amount_value),
            amount_currency: Some(row.amount_currency),
            limit_price_value: row.limit_price_value,
            limit_price_currency: row.limit_price_currency,
            user_reference: row.user_reference,
            timestamp: Some(row.timestamp),
            created_on: Utc::now(),
            updated_on: None,
        })
        .unwrap();
        assert_eq!(back.uid(), Some(OrderUid::from(3)));
        assert_eq!(back.order_id(), order.order_id());
        assert_eq!(back.limit_price(), order.limit_price());
        assert_eq!(back.timestamp(), order.timestamp());
    }
}
