//! One-shot symbol index refresh, for an external scheduler.
//! Exits non-zero when the catalog fetch or the table swap fails.

use anyhow::{Context, Result};
use bot::{config::Config, init_tracing};
use coin::{PriceClient, SymbolStore, refresh::refresh};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;

    let price_client = PriceClient::new(config.api_base.clone(), config.timeout)
        .context("init price client failed")?;
    let symbol_store =
        SymbolStore::connect(&config.database_url, config.symbol_table.clone(), config.timeout)
            .await
            .context("init symbol store failed")?;

    let stored = refresh(&price_client, &symbol_store)
        .await
        .context("symbol refresh failed")?;

    info!(stored, "symbol refresh complete");
    Ok(())
}
