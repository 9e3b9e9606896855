pub mod config;
pub mod store;

pub use config::DbConfig;
pub use store::TradeStore;
