mod corrupt_rows;
mod order_trades;
mod trade_lifecycle;
mod trade_roundtrip;

use chrono::SubsecRound;
use rand::Rng;
use rust_decimal::Decimal;
use trade_store::TradeStore;
use tradelog_core::prelude::*;

pub use corrupt_rows::corrupt_type_column;
pub use order_trades::{batch_insert, constraint_violations, order_trades};
pub use trade_lifecycle::{save_then_update, update_and_delete};
pub use trade_roundtrip::{reference_trade_roundtrip, trade_roundtrip_without_optionals};

pub fn init_logs() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

/// Runs every scenario against a store whose schema is already applied
pub async fn execute_tests(store: &TradeStore) {
    reference_trade_roundtrip(store).await;
    trade_roundtrip_without_optionals(store).await;
    save_then_update(store).await;
    update_and_delete(store).await;
    order_trades(store).await;
    batch_insert(store).await;
    constraint_violations(store).await;
}

/// Identifiers that do not collide with earlier runs against the same database
pub(crate) fn unique(prefix: &str) -> String {
    let suffix: u64 = rand::rng().random();
    format!("{prefix}-{suffix:016x}")
}

pub(crate) fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

pub(crate) async fn stored_order(store: &TradeStore, currency_pair: &str) -> Order {
    let order = Order::new(
        unique("order"),
        OrderType::Bid,
        currency_pair,
        CurrencyAmount::new(dec("10"), "BTC"),
        chrono::Utc::now().trunc_subsecs(0).fixed_offset(),
    )
    .with_limit_price(CurrencyAmount::new(dec("30000"), "USD"));
    let result = store.insert_order(&order).await;
    assert!(
        result.is_ok(),
        "Failed to TradeStore::insert_order: {:?}",
        result.unwrap_err()
    );
    result.unwrap()
}
