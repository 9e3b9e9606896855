use anyhow::Context;
use dotenvy::dotenv;
use trade_store::{DbConfig, TradeStore};

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    dotenv().ok(); // `.env` is optional, the environment may already be set
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = DbConfig::from_env().context("Failed to read the database configuration")?;
    let store = TradeStore::new(&config).context("Failed to create the trade store")?;

    log::info!("Testing connection with the database: {:?}", config.address());
    store
        .check_connection()
        .await
        .context("Failed to connect to the database")?;
    log::info!("Database connection successful");

    store
        .apply_schema()
        .await
        .context("Failed to apply the schema")?;
    log::info!("Database {:?} is ready to store trades", config.address());
    Ok(())
}
