use chrono::{SubsecRound, Utc};
use trade_store::TradeStore;
use tradelog_core::prelude::*;
use tradelog_errors::TradelogError;

use crate::{dec, stored_order, unique};

fn new_trade(order: &Order, trade_id: String) -> Trade {
    Trade::new(
        trade_id,
        OrderType::Bid,
        order.uid().expect("stored orders have a uid"),
        order.currency_pair(),
        CurrencyAmount::new(dec("0.25"), "BTC"),
        CurrencyAmount::new(dec("29500.5"), "USD"),
        // whole seconds, the database keeps microseconds
        Utc::now().trunc_subsecs(0).fixed_offset(),
    )
}

pub async fn save_then_update(store: &TradeStore) {
    let order = stored_order(store, "BTC/USD").await;
    let mut trade = new_trade(&order, unique("T3"));

    store
        .save_trade(&mut trade)
        .await
        .expect("Failed to insert through TradeStore::save_trade");
    let uid = trade.uid().expect("save_trade assigns the uid");
    let created_on = trade.created_on();

    trade.set_fee(Some(CurrencyAmount::new(dec("0.0001"), "BTC")));
    trade.set_user_reference(Some("late-ref".into()));
    store
        .save_trade(&mut trade)
        .await
        .expect("Failed to update through TradeStore::save_trade");

    // Updates keep the uid and the creation time
    assert_eq!(trade.uid(), Some(uid));
    assert_eq!(trade.created_on(), created_on);
    assert!(trade.updated_on().is_some());

    let reloaded = store
        .get_trade(uid)
        .await
        .expect("Failed to TradeStore::get_trade")
        .expect("the trade was just stored");
    assert_eq!(reloaded, trade);
    assert_eq!(reloaded.user_reference(), Some("late-ref"));

    // Clearing an optional field writes nulls
    trade.set_fee(None);
    let updated = store
        .update_trade(&trade)
        .await
        .expect("Failed to TradeStore::update_trade");
    assert_eq!(updated.fee(), None);
}

pub async fn update_and_delete(store: &TradeStore) {
    let order = stored_order(store, "BTC/USD").await;
    let stored = store
        .insert_trade(&new_trade(&order, unique("T4")))
        .await
        .expect("Failed to TradeStore::insert_trade");
    let uid = stored.uid().expect("stored trades have a uid");

    // A stored trade cannot be inserted twice
    let result = store.insert_trade(&stored).await;
    assert!(
        matches!(result, Err(TradelogError::InvalidData(_))),
        "Expected InvalidData, got {:?}",
        result
    );

    let result = store.delete_trade(uid).await;
    assert!(
        result.is_ok(),
        "Failed to TradeStore::delete_trade: {:?}",
        result.unwrap_err()
    );
    assert!(result.unwrap());
    assert!(!store.delete_trade(uid).await.expect("delete is idempotent"));
    assert!(store
        .get_trade(uid)
        .await
        .expect("Failed to TradeStore::get_trade")
        .is_none());

    // Updating a deleted trade finds nothing
    let result = store.update_trade(&stored).await;
    assert!(
        matches!(result, Err(TradelogError::NotFound(_))),
        "Expected NotFound, got {:?}",
        result
    );
}
