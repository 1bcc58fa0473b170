use coin::{Lookup, PriceClient, SymbolStore};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod slack;

use slack::SlackClient;

pub struct Data {
    pub lookup: Lookup<SymbolStore, PriceClient>,
    pub slack: SlackClient,
    pub signing_secret: String,
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
