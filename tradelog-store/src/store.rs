use chrono::Utc;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{
    pooled_connection::{
        deadpool::{Object, Pool},
        AsyncDieselConnectionManager,
    },
    AsyncPgConnection, RunQueryDsl, SimpleAsyncConnection,
};
use tradelog_core::{
    db::{
        models::{DbOrder, DbTrade, NewDbOrder, NewDbTrade},
        schema::{orders, trades},
    },
    prelude::{Order, OrderUid, Trade, TradeUid},
};
use tradelog_errors::TradelogError;

use crate::config::DbConfig;

/// DDL of the `orders` and `trades` tables. Safe to run more than once
pub const SCHEMA: &str =
    include_str!("../../migrations/2024-01-01-000000_create_orders_and_trades/up.sql");

/// Logs internal failures before handing them back to the caller
fn failure(operation: &str, e: impl Into<TradelogError>) -> TradelogError {
    let e = e.into();
    if e.is_internal() {
        log::error!("[INTERNAL ERROR] {}: {:?}", operation, e);
    }
    e
}

/// Reads and writes trades and their orders.
///
/// Every operation borrows a connection from the pool for its own duration
/// and gives it back when it returns.
#[derive(Clone)]
pub struct TradeStore {
    pool: Pool<AsyncPgConnection>, // Clone only increases reference counting
}

impl TradeStore {
    pub fn new(config: &DbConfig) -> Result<Self, TradelogError> {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url.clone());
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .build()?;
        log::info!(
            "Trade store pool ready. Database Address: {:?}, max connections: {}",
            config.address(),
            config.max_connections
        );
        Ok(Self { pool })
    }

    pub fn from_env() -> Result<Self, TradelogError> {
        Self::new(&DbConfig::from_env()?)
    }

    async fn connection(&self) -> Result<Object<AsyncPgConnection>, TradelogError> {
        self.pool
            .get()
            .await
            .map_err(|e| failure("acquiring a connection", e))
    }

    pub async fn check_connection(&self) -> Result<(), TradelogError> {
        let conn = &mut *self.connection().await?;
        diesel::sql_query("SELECT 1")
            .execute(conn)
            .await
            .map_err(|e| failure("check_connection", e))?;
        Ok(())
    }

    /// Creates the tables when they do not exist yet
    pub async fn apply_schema(&self) -> Result<(), TradelogError> {
        let conn = &mut *self.connection().await?;
        conn.batch_execute(SCHEMA)
            .await
            .map_err(|e| failure("apply_schema", e))?;
        log::info!("Schema of the orders and trades tables applied");
        Ok(())
    }

    /// Stores a new order. The returned copy carries the uid assigned by the database
    pub async fn insert_order(&self, order: &Order) -> Result<Order, TradelogError> {
        if let Some(uid) = order.uid() {
            return Err(TradelogError::InvalidData(format!(
                "order {} is already stored with uid {}",
                order.order_id(),
                uid
            )));
        }
        let conn = &mut *self.connection().await?;
        let row = diesel::insert_into(orders::table)
            .values(NewDbOrder::from(order))
            .returning(DbOrder::as_returning())
            .get_result(conn)
            .await
            .map_err(|e| failure("insert_order", e))?;
        let stored = Order::try_from(row)?;
        log::debug!("Stored order {} with uid {:?}", stored.order_id(), stored.uid());
        Ok(stored)
    }

    pub async fn get_order(&self, uid: OrderUid) -> Result<Option<Order>, TradelogError> {
        let conn = &mut *self.connection().await?;
        let row: Option<DbOrder> = orders::table
            .find(uid)
            .select(DbOrder::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(|e| failure("get_order", e))?;
        row.map(Order::try_from).transpose()
    }

    pub async fn find_order_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<Order>, TradelogError> {
        let conn = &mut *self.connection().await?;
        let row: Option<DbOrder> = orders::table
            .filter(orders::order_id.eq(order_id))
            .order(orders::uid.asc())
            .select(DbOrder::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(|e| failure("find_order_by_order_id", e))?;
        row.map(Order::try_from).transpose()
    }

    /// Returns false when no such order exists.
    /// Fails with a constraint violation while trades still reference it.
    pub async fn delete_order(&self, uid: OrderUid) -> Result<bool, TradelogError> {
        let conn = &mut *self.connection().await?;
        let removed_rows = diesel::delete(orders::table.find(uid))
            .execute(conn)
            .await
            .map_err(|e| failure("delete_order", e))?;
        log::debug!("Deleted order {}: {}", uid, removed_rows == 1);
        Ok(removed_rows == 1)
    }

    /// Stores a new trade. The returned copy carries the uid assigned by the database.
    /// Fails with a constraint violation when its order does not exist.
    pub async fn insert_trade(&self, trade: &Trade) -> Result<Trade, TradelogError> {
        if let Some(uid) = trade.uid() {
            return Err(TradelogError::InvalidData(format!(
                "trade {} is already stored with uid {}",
                trade.trade_id(),
                uid
            )));
        }
        let conn = &mut *self.connection().await?;
        let row = diesel::insert_into(trades::table)
            .values(NewDbTrade::from(trade))
            .returning(DbTrade::as_returning())
            .get_result(conn)
            .await
            .map_err(|e| failure("insert_trade", e))?;
        let stored = Trade::try_from(row)?;
        log::debug!(
            "Stored trade {} of order {} with uid {:?}",
            stored.trade_id(),
            stored.order(),
            stored.uid()
        );
        Ok(stored)
    }

    /// Stores several new trades with a single statement, all or nothing.
    /// The stored copies come back in input order: identity values are
    /// drawn in row order within one statement, so sorting by uid restores it.
    pub async fn insert_trades(&self, new_trades: &[Trade]) -> Result<Vec<Trade>, TradelogError> {
        if let Some(stored) = new_trades.iter().find(|t| t.uid().is_some()) {
            return Err(TradelogError::InvalidData(format!(
                "trade {} is already stored",
                stored.trade_id()
            )));
        }
        if new_trades.is_empty() {
            return Ok(Vec::new());
        }
        let rows = new_trades.iter().map(NewDbTrade::from).collect::<Vec<_>>();
        let conn = &mut *self.connection().await?;
        let mut inserted: Vec<DbTrade> = diesel::insert_into(trades::table)
            .values(&rows)
            .returning(DbTrade::as_returning())
            .get_results(conn)
            .await
            .map_err(|e| failure("insert_trades", e))?;
        if inserted.len() != rows.len() {
            return Err(failure(
                "insert_trades",
                tradelog_errors::db_error!(format!(
                    "inserted {} trades out of {}",
                    inserted.len(),
                    rows.len()
                )),
            ));
        }
        inserted.sort_by_key(|row| row.uid);
        log::debug!("Stored {} trades", inserted.len());
        inserted.into_iter().map(Trade::try_from).collect()
    }

    /// Writes every mutable column of a stored trade and stamps `updated_on`
    pub async fn update_trade(&self, trade: &Trade) -> Result<Trade, TradelogError> {
        let uid = trade.uid().ok_or_else(|| {
            TradelogError::InvalidData(format!(
                "trade {} has not been stored yet",
                trade.trade_id()
            ))
        })?;
        let changes = NewDbTrade::from(trade);
        let conn = &mut *self.connection().await?;
        let row = diesel::update(trades::table.find(uid))
            .set((&changes, trades::updated_on.eq(Utc::now())))
            .returning(DbTrade::as_returning())
            .get_result(conn)
            .await
            .optional()
            .map_err(|e| failure("update_trade", e))?
            .ok_or_else(|| TradelogError::NotFound(format!("trade {}", uid)))?;
        log::debug!("Updated trade {} ({})", uid, trade.trade_id());
        Trade::try_from(row)
    }

    /// Inserts the trade when it has no uid yet, updates it otherwise.
    /// The uid and audit fields assigned by the database are written back.
    pub async fn save_trade(&self, trade: &mut Trade) -> Result<(), TradelogError> {
        let stored = match trade.uid() {
            None => self.insert_trade(trade).await?,
            Some(_) => self.update_trade(trade).await?,
        };
        trade.sync_storage_fields(&stored);
        Ok(())
    }

    pub async fn get_trade(&self, uid: TradeUid) -> Result<Option<Trade>, TradelogError> {
        let conn = &mut *self.connection().await?;
        let row: Option<DbTrade> = trades::table
            .find(uid)
            .select(DbTrade::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(|e| failure("get_trade", e))?;
        row.map(Trade::try_from).transpose()
    }

    /// Looks a trade up by the identifier the exchange gave it
    pub async fn find_trade_by_trade_id(
        &self,
        trade_id: &str,
    ) -> Result<Option<Trade>, TradelogError> {
        let conn = &mut *self.connection().await?;
        let row: Option<DbTrade> = trades::table
            .filter(trades::trade_id.eq(trade_id))
            .order(trades::uid.asc())
            .select(DbTrade::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(|e| failure("find_trade_by_trade_id", e))?;
        row.map(Trade::try_from).transpose()
    }

    /// Trades of one order, oldest first
    pub async fn get_order_trades(&self, order: OrderUid) -> Result<Vec<Trade>, TradelogError> {
        let conn = &mut *self.connection().await?;
        let rows: Vec<DbTrade> = trades::table
            .filter(trades::fk_order_uid.eq(order))
            .order((trades::timestamp.asc(), trades::uid.asc()))
            .select(DbTrade::as_select())
            .load(conn)
            .await
            .map_err(|e| failure("get_order_trades", e))?;
        rows.into_iter().map(Trade::try_from).collect()
    }

    /// Every trade, oldest first
    pub async fn get_trades(&self) -> Result<Vec<Trade>, TradelogError> {
        let conn = &mut *self.connection().await?;
        let rows: Vec<DbTrade> = trades::table
            .order((trades::timestamp.asc(), trades::uid.asc()))
            .select(DbTrade::as_select())
            .load(conn)
            .await
            .map_err(|e| failure("get_trades", e))?;
        rows.into_iter().map(Trade::try_from).collect()
    }

    /// Loads the order a trade belongs to
    pub async fn order_of(&self, trade: &Trade) -> Result<Order, TradelogError> {
        self.get_order(trade.order()).await?.ok_or_else(|| {
            TradelogError::NotFound(format!(
                "order {} of trade {}",
                trade.order(),
                trade.trade_id()
            ))
        })
    }

    /// Returns false when no such trade exists
    pub async fn delete_trade(&self, uid: TradeUid) -> Result<bool, TradelogError> {
        let conn = &mut *self.connection().await?;
        let removed_rows = diesel::delete(trades::table.find(uid))
            .execute(conn)
            .await
            .map_err(|e| failure("delete_trade", e))?;
        log::debug!("Deleted trade {}: {}", uid, removed_rows == 1);
        Ok(removed_rows == 1)
    }
}
