mod error;
mod price_client;
mod quote;
mod symbol_store;

pub mod lookup;
pub mod metrics;
pub mod presenter;
pub mod refresh;

#[cfg(test)]
mod testing;

pub use error::{Error, FetchError, Result};
pub use lookup::{Lookup, Reply};
pub use price_client::{DEFAULT_BASE_API, PriceClient, QuoteSource};
pub use quote::TickerQuote;
pub use symbol_store::{SymbolIndex, SymbolStore, normalize};
