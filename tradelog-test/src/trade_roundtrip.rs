use chrono::{FixedOffset, TimeZone, Utc};
use trade_store::TradeStore;
use tradelog_core::prelude::*;

use crate::{dec, stored_order, unique};

/// T1 style trade: BID 1.5 BTC @ 30000 USD, fee 0.01 BTC, at 2024-01-01T00:00:00Z
pub async fn reference_trade_roundtrip(store: &TradeStore) {
    let order = stored_order(store, "BTC/USD").await;
    let order_uid = order.uid().expect("stored orders have a uid");

    let trade_id = unique("T1");
    let mut trade = Trade::new(
        trade_id.clone(),
        OrderType::Bid,
        order_uid,
        "BTC/USD",
        CurrencyAmount::new(dec("1.5"), "BTC"),
        CurrencyAmount::new(dec("30000"), "USD"),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().fixed_offset(),
    )
    .with_fee(CurrencyAmount::new(dec("0.01"), "BTC"))
    .with_user_reference("ref1");

    // Expect to find no trade
    let result = store.find_trade_by_trade_id(&trade_id).await;
    assert!(
        result.is_ok(),
        "Failed to TradeStore::find_trade_by_trade_id: {:?}",
        result.unwrap_err()
    );
    assert!(result.unwrap().is_none());

    // Save the trade
    let result = store.save_trade(&mut trade).await;
    assert!(
        result.is_ok(),
        "Failed to TradeStore::save_trade: {:?}",
        result.unwrap_err()
    );
    let uid = trade.uid().expect("save_trade assigns the uid");
    assert!(trade.created_on().is_some());
    assert!(trade.updated_on().is_none());

    // Reload by surrogate key
    let result = store.get_trade(uid).await;
    assert!(
        result.is_ok(),
        "Failed to TradeStore::get_trade: {:?}",
        result.unwrap_err()
    );
    let reloaded = result.unwrap().expect("the trade was just stored");
    assert_eq!(reloaded, trade);
    assert_eq!(reloaded.uid(), Some(uid));
    assert_eq!(reloaded.trade_id(), trade_id);
    assert_eq!(reloaded.trade_type(), OrderType::Bid);
    assert_eq!(reloaded.order(), order_uid);
    assert_eq!(reloaded.currency_pair(), "BTC/USD");
    assert_eq!(reloaded.amount(), &CurrencyAmount::new(dec("1.5"), "BTC"));
    assert_eq!(reloaded.price(), &CurrencyAmount::new(dec("30000"), "USD"));
    assert_eq!(reloaded.fee(), Some(&CurrencyAmount::new(dec("0.01"), "BTC")));
    assert_eq!(reloaded.user_reference(), Some("ref1"));
    assert_eq!(
        reloaded.timestamp(),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    );

    // Reload by exchange identifier
    let by_trade_id = store
        .find_trade_by_trade_id(&trade_id)
        .await
        .expect("Failed to TradeStore::find_trade_by_trade_id")
        .expect("the trade was just stored");
    assert_eq!(by_trade_id, trade);

    // The parent order is loaded on demand
    let parent = store
        .order_of(&reloaded)
        .await
        .expect("Failed to TradeStore::order_of");
    assert_eq!(parent, order);
}

pub async fn trade_roundtrip_without_optionals(store: &TradeStore) {
    let order = stored_order(store, "ETH/EUR").await;

    let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
    let trade = Trade::new(
        unique("T2"),
        OrderType::Ask,
        order.uid().expect("stored orders have a uid"),
        "ETH/EUR",
        CurrencyAmount::new(dec("0.000000000000000001"), "ETH"),
        CurrencyAmount::new(dec("1875.25"), "EUR"),
        new_york.with_ymd_and_hms(2024, 3, 10, 8, 30, 15).unwrap(),
    );

    let stored = store
        .insert_trade(&trade)
        .await
        .expect("Failed to TradeStore::insert_trade");
    let reloaded = store
        .get_trade(stored.uid().expect("stored trades have a uid"))
        .await
        .expect("Failed to TradeStore::get_trade")
        .expect("the trade was just stored");

    assert_eq!(reloaded, stored);
    assert_eq!(reloaded.fee(), None);
    assert_eq!(reloaded.user_reference(), None);
    assert_eq!(reloaded.amount().value, dec("0.000000000000000001"));
    // Same instant, read back in UTC
    assert_eq!(reloaded.timestamp(), trade.timestamp());
    assert_eq!(reloaded.timestamp().offset().local_minus_utc(), 0);
}
