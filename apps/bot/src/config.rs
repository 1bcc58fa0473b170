use std::{net::SocketAddr, time::Duration};

use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use coin::DEFAULT_BASE_API;

/// Settings shared by the bot and the one-shot updater.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub symbol_table: String,
    pub api_base: String,
    pub timeout: Duration,
    pub refresh_cron: String,
    pub refresh_tz: Tz,
    pub refresh_on_start: bool,
    pub version: String,
}

/// Settings only the Slack-facing bot needs.
#[derive(Clone)]
pub struct SlackConfig {
    pub token: String,
    pub signing_secret: String,
    pub bind_addr: SocketAddr,
}

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env)
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());
        let refresh_tz = or("REFRESH_TZ", "UTC");

        Ok(Self {
            database_url: var("DATABASE_URL").context("DATABASE_URL not set")?,
            symbol_table: or("SYMBOL_TABLE", "tickers"),
            api_base: or("COINMARKETCAP_API_BASE", DEFAULT_BASE_API),
            timeout: Duration::from_secs(
                or("HTTP_TIMEOUT_SECS", "10")
                    .parse()
                    .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            refresh_cron: or("REFRESH_CRON", "0 0 * * * *"),
            refresh_tz: refresh_tz
                .parse()
                .map_err(|e| anyhow!("invalid REFRESH_TZ {refresh_tz:?}: {e}"))?,
            refresh_on_start: var("REFRESH_ON_START")
                .map(|v| !matches!(v.trim(), "0" | "false" | "no"))
                .unwrap_or(true),
            version: or("APP_VERSION", "Unknown"),
        })
    }
}

impl SlackConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env)
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            token: var("SLACK_BOT_TOKEN").context("SLACK_BOT_TOKEN not set")?,
            signing_secret: var("SLACK_SIGNING_SECRET")
                .filter(|s| !s.trim().is_empty())
                .context("SLACK_SIGNING_SECRET not set")?,
            bind_addr: var("BIND_ADDR")
                .unwrap_or_else(|| "0.0.0.0:3000".to_string())
                .parse()
                .context("BIND_ADDR must be host:port")?,
        })
    }
}
