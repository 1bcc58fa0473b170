use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    metrics::derive,
    presenter::{Attachment, present},
    price_client::QuoteSource,
    symbol_store::{SymbolIndex, normalize},
};

/// Symbols answered with a fixed reply instead of a price card. Checked in order.
pub const CANNED_REPLIES: &[(&str, &str)] = &[("XVG", ":joy::joy::joy:"), ("USD", ":trash:")];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Attachment(Attachment),
}

/// The ticker a chat message asks about: its last word, upper-cased.
/// A trailing user mention or an empty message asks about nothing.
pub fn extract_symbol(text: &str) -> Option<String> {
    let token = text.split_whitespace().last()?;
    if token.starts_with("<@") {
        return None;
    }

    let symbol = token.to_uppercase();
    if normalize(&symbol).is_empty() {
        None
    } else {
        Some(symbol)
    }
}

pub fn canned_reply(symbol: &str) -> Option<&'static str> {
    let key = normalize(symbol);
    CANNED_REPLIES
        .iter()
        .find(|(canned, _)| *canned == key)
        .map(|(_, reply)| *reply)
}

/// Resolve, fetch, derive and present, one request at a time.
pub struct Lookup<I, Q> {
    index: I,
    quotes: Q,
}

impl<I, Q> Lookup<I, Q>
where
    I: SymbolIndex + Sync,
    Q: QuoteSource + Sync,
{
    pub fn new(index: I, quotes: Q) -> Self {
        Self { index, quotes }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn quotes(&self) -> &Q {
        &self.quotes
    }

    /// Price card for one symbol.
    pub async fn price_card(&self, symbol: &str) -> Result<Attachment> {
        let id = self.index.resolve(symbol).await?;
        debug!(symbol, %id, "symbol resolved");

        let quote = self.quotes.fetch_ticker(&id).await?;
        let metric = derive(&quote)?;

        Ok(present(&quote, &metric))
    }

    /// Reply to a chat message, or `None` when it names no symbol.
    pub async fn respond(&self, text: &str) -> Option<Reply> {
        let symbol = extract_symbol(text)?;

        if let Some(reply) = canned_reply(&symbol) {
            debug!(%symbol, "canned reply");
            return Some(Reply::Text(reply.to_string()));
        }

        let shown = normalize(&symbol);
        match self.price_card(&symbol).await {
            Ok(card) => {
                info!(symbol = %shown, "price card built");
                Some(Reply::Attachment(card))
            }
            Err(Error::NotFound(_)) => {
                info!(symbol = %shown, "unknown symbol");
                Some(Reply::Text(format!(
                    "Sorry, I couldn't find a coin called {shown}."
                )))
            }
            Err(e) => {
                warn!(symbol = %shown, error = %e, "lookup failed");
                Some(Reply::Text(format!(
                    "Sorry, I couldn't get a price for {shown} right now."
                )))
            }
        }
    }
}
