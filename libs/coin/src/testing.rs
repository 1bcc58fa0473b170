//! In-memory collaborators for pipeline tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{
    error::{Error, FetchError, Result},
    price_client::QuoteSource,
    quote::TickerQuote,
    symbol_store::{SymbolIndex, normalize},
};

#[derive(Default)]
pub struct MemoryIndex {
    rows: RwLock<HashMap<String, String>>,
}

impl MemoryIndex {
    pub fn with(rows: &[(&str, &str)]) -> Self {
        Self {
            rows: RwLock::new(
                rows.iter()
                    .map(|(ticker, id)| (ticker.to_string(), id.to_string()))
                    .collect(),
            ),
        }
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.rows.read().unwrap().clone()
    }
}

impl SymbolIndex for MemoryIndex {
    async fn resolve(&self, symbol: &str) -> Result<String> {
        let ticker = normalize(symbol);
        match self.rows.read().unwrap().get(&ticker) {
            Some(id) if !id.is_empty() => Ok(id.clone()),
            _ => Err(Error::NotFound(ticker)),
        }
    }

    async fn replace_all(&self, entries: HashMap<String, String>) -> Result<usize> {
        let fresh: HashMap<String, String> = entries
            .into_iter()
            .map(|(ticker, id)| (normalize(&ticker), id))
            .collect();
        let count = fresh.len();
        *self.rows.write().unwrap() = fresh;
        Ok(count)
    }
}

/// Serves canned quotes and counts by-id requests.
#[derive(Default)]
pub struct StaticSource {
    quotes: Vec<TickerQuote>,
    pub by_id_calls: AtomicUsize,
    pub fail_with: Mutex<Option<FetchError>>,
}

impl StaticSource {
    pub fn new(quotes: Vec<TickerQuote>) -> Self {
        Self {
            quotes,
            ..Default::default()
        }
    }

    pub fn failing(err: FetchError) -> Self {
        Self {
            fail_with: Mutex::new(Some(err)),
            ..Default::default()
        }
    }

    fn take_failure(&self) -> Option<FetchError> {
        self.fail_with.lock().unwrap().take()
    }
}

impl QuoteSource for StaticSource {
    async fn fetch_ticker(&self, id: &str) -> std::result::Result<TickerQuote, FetchError> {
        if id.is_empty() {
            return Err(FetchError::EmptyId);
        }
        self.by_id_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.quotes
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or_else(|| FetchError::Empty(id.to_string()))
    }

    async fn fetch_all(&self) -> std::result::Result<Vec<TickerQuote>, FetchError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        Ok(self.quotes.clone())
    }
}

pub fn listing(symbol: &str, id: &str) -> TickerQuote {
    TickerQuote {
        id: id.into(),
        symbol: symbol.into(),
        ..Default::default()
    }
}
