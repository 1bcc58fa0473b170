use std::collections::HashMap;

use tracing::{info, instrument, warn};

use crate::{
    error::Result,
    price_client::QuoteSource,
    symbol_store::{SymbolIndex, normalize},
};

/// Pull the whole provider catalog and swap it into the symbol index.
/// Returns the number of symbols now stored.
#[instrument(name = "refresh_symbols", skip_all)]
pub async fn refresh<Q, I>(source: &Q, index: &I) -> Result<usize>
where
    Q: QuoteSource + Sync,
    I: SymbolIndex + Sync,
{
    let catalog = source.fetch_all().await?;
    info!(listings = catalog.len(), "fetched catalog");

    let mut skipped = 0usize;
    let mut entries: HashMap<String, String> = HashMap::with_capacity(catalog.len());

    // Keys are normalized here so symbols differing only by case or `$` collide
    // in catalog order: the later listing replaces the earlier one.
    for quote in catalog {
        let ticker = normalize(&quote.symbol);
        if ticker.is_empty() || quote.id.trim().is_empty() {
            skipped += 1;
            continue;
        }
        entries.insert(ticker, quote.id);
    }

    if skipped > 0 {
        warn!(skipped, "listings without symbol or id");
    }

    let stored = index.replace_all(entries).await?;
    info!(stored, "symbol index replaced");

    Ok(stored)
}
