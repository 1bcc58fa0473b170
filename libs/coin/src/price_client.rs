use std::{future::Future, time::Duration};

use anyhow::Result;
use reqwest::Client;
use tracing::debug;

use crate::{error::FetchError, quote::TickerQuote};

pub const DEFAULT_BASE_API: &str = "https://api.coinmarketcap.com/v1";

/// Source of provider quotes. Implemented by [`PriceClient`] and by test doubles.
pub trait QuoteSource {
    /// Fetch the single record stored under a provider id.
    fn fetch_ticker(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<TickerQuote, FetchError>> + Send;

    /// Fetch the full catalog, uncapped.
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<TickerQuote>, FetchError>> + Send;
}

#[derive(Clone)]
pub struct PriceClient {
    client: Client,
    base_api: String,
}

impl PriceClient {
    pub fn new(base_api: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_api })
    }

    fn ticker_url(&self, id: &str) -> String {
        format!("{}/ticker/{}/", self.base_api.trim_end_matches('/'), id)
    }

    fn catalog_url(&self) -> String {
        format!("{}/ticker/", self.base_api.trim_end_matches('/'))
    }

    async fn get(&self, url: String, query: &[(&str, &str)]) -> Result<Vec<u8>, FetchError> {
        debug!(%url, "requesting tickers");

        let body = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        Ok(body.to_vec())
    }
}

impl QuoteSource for PriceClient {
    async fn fetch_ticker(&self, id: &str) -> Result<TickerQuote, FetchError> {
        if id.trim().is_empty() {
            return Err(FetchError::EmptyId);
        }

        let body = self.get(self.ticker_url(id), &[]).await?;
        first_quote(id, &body)
    }

    async fn fetch_all(&self) -> Result<Vec<TickerQuote>, FetchError> {
        let body = self.get(self.catalog_url(), &[("limit", "0")]).await?;
        decode_quotes(&body)
    }
}

pub(crate) fn decode_quotes(body: &[u8]) -> Result<Vec<TickerQuote>, FetchError> {
    Ok(serde_json::from_slice(body)?)
}

pub(crate) fn first_quote(id: &str, body: &[u8]) -> Result<TickerQuote, FetchError> {
    decode_quotes(body)?
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Empty(id.to_string()))
}
