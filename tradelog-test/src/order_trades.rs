use chrono::{TimeZone, Utc};
use trade_store::TradeStore;
use tradelog_core::prelude::*;
use tradelog_errors::TradelogError;

use crate::{dec, stored_order, unique};

fn fill(order: OrderUid, trade_id: String, minute: u32, amount: &str) -> Trade {
    Trade::new(
        trade_id,
        OrderType::Ask,
        order,
        "BTC/GBP",
        CurrencyAmount::new(dec(amount), "BTC"),
        CurrencyAmount::new(dec("24000"), "GBP"),
        Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0)
            .unwrap()
            .fixed_offset(),
    )
}

pub async fn order_trades(store: &TradeStore) {
    let order = stored_order(store, "BTC/GBP").await;
    let other = stored_order(store, "BTC/GBP").await;
    let order_uid = order.uid().expect("stored orders have a uid");
    let other_uid = other.uid().expect("stored orders have a uid");

    // Inserted out of chronological order
    for (minute, amount) in [(30, "0.3"), (10, "0.1"), (20, "0.2")] {
        store
            .insert_trade(&fill(order_uid, unique("fill"), minute, amount))
            .await
            .expect("Failed to TradeStore::insert_trade");
    }
    store
        .insert_trade(&fill(other_uid, unique("fill"), 0, "5"))
        .await
        .expect("Failed to TradeStore::insert_trade");

    let trades = store
        .get_order_trades(order_uid)
        .await
        .expect("Failed to TradeStore::get_order_trades");
    assert_eq!(trades.len(), 3);
    assert!(trades.iter().all(|t| t.order() == order_uid));
    assert_eq!(
        trades
            .iter()
            .map(|t| t.amount().value)
            .collect::<Vec<_>>(),
        vec![dec("0.1"), dec("0.2"), dec("0.3")]
    );
    assert!(trades
        .windows(2)
        .all(|w| w[0].timestamp() <= w[1].timestamp()));

    // Every trade leads back to its own order
    for trade in &trades {
        let parent = store
            .order_of(trade)
            .await
            .expect("Failed to TradeStore::order_of");
        assert_eq!(parent, order);
    }

    let all = store
        .get_trades()
        .await
        .expect("Failed to TradeStore::get_trades");
    assert!(all.len() >= 4);
    assert!(all.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
    for trade in &trades {
        assert!(all.contains(trade));
    }
}

pub async fn batch_insert(store: &TradeStore) {
    let order = stored_order(store, "BTC/GBP").await;
    let order_uid = order.uid().expect("stored orders have a uid");

    assert!(store
        .insert_trades(&[])
        .await
        .expect("Empty batches are accepted")
        .is_empty());

    let batch = (0..5)
        .map(|i| fill(order_uid, unique("batch"), 40 + i, "0.01"))
        .collect::<Vec<_>>();
    let stored = store
        .insert_trades(&batch)
        .await
        .expect("Failed to TradeStore::insert_trades");
    assert_eq!(stored.len(), batch.len());
    for (stored, original) in stored.iter().zip(&batch) {
        assert!(stored.uid().is_some());
        assert_eq!(stored.trade_id(), original.trade_id());
        assert_eq!(stored.timestamp(), original.timestamp());
    }

    // Stored trades are refused as a whole
    let result = store.insert_trades(&stored).await;
    assert!(
        matches!(result, Err(TradelogError::InvalidData(_))),
        "Expected InvalidData, got {:?}",
        result
    );
    let trades = store
        .get_order_trades(order_uid)
        .await
        .expect("Failed to TradeStore::get_order_trades");
    assert_eq!(trades, stored);
}

pub async fn constraint_violations(store: &TradeStore) {
    // No order carries this uid
    let orphan = fill(OrderUid::from(i64::MAX), unique("orphan"), 0, "1");
    let result = store.insert_trade(&orphan).await;
    assert!(
        matches!(result, Err(TradelogError::ConstraintViolation(_))),
        "Expected ConstraintViolation, got {:?}",
        result
    );
    let missing = store
        .find_trade_by_trade_id(orphan.trade_id())
        .await
        .expect("Failed to TradeStore::find_trade_by_trade_id");
    assert!(missing.is_none());

    // An order cannot go while trades reference it
    let order = stored_order(store, "BTC/GBP").await;
    let order_uid = order.uid().expect("stored orders have a uid");
    let trade = store
        .insert_trade(&fill(order_uid, unique("fill"), 0, "1"))
        .await
        .expect("Failed to TradeStore::insert_trade");

    let result = store.delete_order(order_uid).await;
    assert!(
        matches!(result, Err(TradelogError::ConstraintViolation(_))),
        "Expected ConstraintViolation, got {:?}",
        result
    );

    // Once its trades are gone the order can be deleted
    assert!(store
        .delete_trade(trade.uid().expect("stored trades have a uid"))
        .await
        .expect("Failed to TradeStore::delete_trade"));
    assert!(store
        .delete_order(order_uid)
        .await
        .expect("Failed to TradeStore::delete_order"));
    assert!(store
        .get_order(order_uid)
        .await
        .expect("Failed to TradeStore::get_order")
        .is_none());
    let found = store
        .find_order_by_order_id(order.order_id())
        .await
        .expect("Failed to TradeStore::find_order_by_order_id");
    assert!(found.is_none());
}
