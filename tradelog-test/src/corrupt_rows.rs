use diesel::sql_types::BigInt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use trade_store::{DbConfig, TradeStore};
use tradelog_core::prelude::*;
use tradelog_errors::TradelogError;

use crate::{dec, stored_order, unique};

/// A TYPE value that is not an exact symbolic name is reported as invalid data
pub async fn corrupt_type_column(store: &TradeStore, config: &DbConfig) {
    let order = stored_order(store, "BTC/USD").await;
    let order_uid = order.uid().expect("stored orders have a uid");
    let trade = store
        .insert_trade(&Trade::new(
            unique("corrupt"),
            OrderType::Bid,
            order_uid,
            "BTC/USD",
            CurrencyAmount::new(dec("1"), "BTC"),
            CurrencyAmount::new(dec("30000"), "USD"),
            order.timestamp(),
        ))
        .await
        .expect("Failed to TradeStore::insert_trade");
    let uid = trade.uid().expect("stored trades have a uid");

    // Written behind the store's back
    let mut conn = AsyncPgConnection::establish(&config.database_url)
        .await
        .expect("Could not open a raw connection");
    let updated = diesel::sql_query("UPDATE TRADES SET TYPE = 'bid' WHERE UID = $1")
        .bind::<BigInt, _>(i64::from(uid))
        .execute(&mut conn)
        .await
        .expect("Could not corrupt the TYPE column");
    assert_eq!(updated, 1);

    let result = store.find_trade_by_trade_id(trade.trade_id()).await;
    let expected = format!("trade {uid}: type");
    assert!(
        matches!(&result, Err(TradelogError::InvalidData(msg)) if msg.starts_with(&expected)),
        "Expected InvalidData naming the row and the column, got {:?}",
        result
    );
    let result = store.get_order_trades(order_uid).await;
    assert!(
        matches!(result, Err(TradelogError::InvalidData(_))),
        "Expected InvalidData, got {:?}",
        result
    );

    // Unreadable rows can still be removed
    assert!(store
        .delete_trade(uid)
        .await
        .expect("Failed to TradeStore::delete_trade"));
    assert!(store
        .get_order_trades(order_uid)
        .await
        .expect("Failed to TradeStore::get_order_trades")
        .is_empty());
}
