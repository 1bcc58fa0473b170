use std::{collections::HashMap, future::Future, time::Duration};

use anyhow::{Context, ensure};
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Ticker symbol to provider id lookup table.
pub trait SymbolIndex {
    /// Resolve a user-supplied symbol to its provider id.
    fn resolve(&self, symbol: &str) -> impl Future<Output = Result<String>> + Send;

    /// Replace the whole table with `entries`. Readers see either the old or the new contents.
    fn replace_all(
        &self,
        entries: HashMap<String, String>,
    ) -> impl Future<Output = Result<usize>> + Send;
}

/// Canonical key form shared by the write and read paths: `" $btc "` becomes `"BTC"`.
pub fn normalize(symbol: &str) -> String {
    symbol.trim().trim_start_matches('$').to_uppercase()
}

fn valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Clone)]
pub struct SymbolStore {
    pool: PgPool,
    table: String,
}

impl SymbolStore {
    pub async fn connect(
        database_url: &str,
        table: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let statement_timeout = format!("{}ms", timeout.as_millis());
        let options: PgConnectOptions = database_url
            .parse::<PgConnectOptions>()
            .context("invalid DATABASE_URL")?
            .options([("statement_timeout", statement_timeout.as_str())]);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(timeout)
            .connect_with(options)
            .await
            .context("connect to symbol database")?;

        Self::from_pool(pool, table).await
    }

    /// Wrap an existing pool, creating the table if it is missing.
    pub async fn from_pool(pool: PgPool, table: impl Into<String>) -> anyhow::Result<Self> {
        let table = table.into();
        ensure!(valid_table_name(&table), "invalid table name: {table:?}");

        let store = Self { pool, table };
        store.ensure_schema().await?;

        info!(table = %store.table, "symbol store ready");
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (ticker TEXT PRIMARY KEY, id TEXT NOT NULL)",
            self.table
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }

    /// Number of rows currently in the table
    pub async fn len(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

impl SymbolIndex for SymbolStore {
    async fn resolve(&self, symbol: &str) -> Result<String> {
        let ticker = normalize(symbol);
        if ticker.is_empty() {
            return Err(Error::NotFound(ticker));
        }

        let id: Option<String> =
            sqlx::query_scalar(&format!("SELECT id FROM {} WHERE ticker = $1", self.table))
                .bind(&ticker)
                .fetch_optional(&self.pool)
                .await?;

        debug!(%ticker, ?id, "resolved symbol");

        match id {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(Error::NotFound(ticker)),
        }
    }

    async fn replace_all(&self, entries: HashMap<String, String>) -> Result<usize> {
        let (tickers, ids): (Vec<String>, Vec<String>) = entries
            .into_iter()
            .map(|(ticker, id)| (normalize(&ticker), id))
            .filter(|(ticker, _)| !ticker.is_empty())
            .collect::<HashMap<_, _>>()
            .into_iter()
            .unzip();

        // DELETE rather than TRUNCATE: concurrent readers keep seeing the old rows until commit.
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DELETE FROM {}", self.table))
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query(&format!(
            "INSERT INTO {} (ticker, id) SELECT * FROM UNNEST($1::text[], $2::text[])",
            self.table
        ))
        .bind(&tickers)
        .bind(&ids)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(inserted as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollar_prefix_and_case_collapse_to_one_key() {
        assert_eq!(normalize("$BTC"), "BTC");
        assert_eq!(normalize("BTC"), "BTC");
        assert_eq!(normalize(" $btc "), "BTC");
        assert_eq!(normalize("$$eth"), "ETH");
        assert_eq!(normalize("$"), "");
    }

    async fn store(pool: PgPool) -> SymbolStore {
        SymbolStore::from_pool(pool, "tickers").await.unwrap()
    }

    fn catalog(rows: &[(&str, &str)]) -> HashMap<String, String> {
        rows.iter()
            .map(|(ticker, id)| (ticker.to_string(), id.to_string()))
            .collect()
    }

    async fn rows(store: &SymbolStore) -> Vec<(String, String)> {
        sqlx::query_as("SELECT ticker, id FROM tickers ORDER BY ticker")
            .fetch_all(&store.pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a Postgres server"]
    async fn replace_drops_prior_rows(pool: PgPool) {
        let store = store(pool).await;
        store
            .replace_all(catalog(&[("XRP", "ripple"), ("BTC", "old-bitcoin")]))
            .await
            .unwrap();

        let stored = store
            .replace_all(catalog(&[("BTC", "bitcoin"), ("ETH", "ethereum")]))
            .await
            .unwrap();

        assert_eq!(stored, 2);
        assert_eq!(
            rows(&store).await,
            vec![
                ("BTC".to_string(), "bitcoin".to_string()),
                ("ETH".to_string(), "ethereum".to_string()),
            ]
        );
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a Postgres server"]
    async fn resolve_normalizes_and_reports_missing(pool: PgPool) {
        let store = store(pool).await;
        store
            .replace_all(catalog(&[("btc", "bitcoin")]))
            .await
            .unwrap();

        assert_eq!(store.resolve("$BTC").await.unwrap(), "bitcoin");
        assert_eq!(store.resolve("btc").await.unwrap(), "bitcoin");
        assert!(matches!(
            store.resolve("DOGE").await,
            Err(Error::NotFound(ticker)) if ticker == "DOGE"
        ));
        assert!(matches!(store.resolve("$").await, Err(Error::NotFound(_))));
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a Postgres server"]
    async fn empty_catalog_empties_the_table(pool: PgPool) {
        let store = store(pool).await;
        store
            .replace_all(catalog(&[("BTC", "bitcoin")]))
            .await
            .unwrap();

        let stored = store.replace_all(HashMap::new()).await.unwrap();

        assert_eq!(stored, 0);
        assert!(store.is_empty().await.unwrap());
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a Postgres server"]
    async fn failed_insert_keeps_old_rows(pool: PgPool) {
        let store = store(pool).await;
        store
            .replace_all(catalog(&[("BTC", "bitcoin")]))
            .await
            .unwrap();

        // Postgres text cannot hold NUL, so the insert fails after the DELETE ran.
        let err = store
            .replace_all(catalog(&[("ETH", "ether\0eum")]))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(
            rows(&store).await,
            vec![("BTC".to_string(), "bitcoin".to_string())]
        );
    }

    #[test]
    fn table_names_are_plain_identifiers() {
        assert!(valid_table_name("tickers"));
        assert!(valid_table_name("_coin_ids2"));
        assert!(!valid_table_name(""));
        assert!(!valid_table_name("2tickers"));
        assert!(!valid_table_name("tickers; DROP TABLE users"));
        assert!(!valid_table_name("public.tickers"));
    }
}
