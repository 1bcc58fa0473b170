use serde::{Deserialize, Deserializer};

//
// Match CoinMarketCap v1 ticker JSON
// Every numeric value arrives as a string, and any of them may be missing or null.
//
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TickerQuote {
    #[serde(deserialize_with = "null_as_empty")]
    pub id: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub symbol: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub rank: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub price_usd: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub price_btc: String,

    #[serde(rename = "24h_volume_usd", deserialize_with = "null_as_empty")]
    pub volume_usd_24h: String,

    #[serde(rename = "market_cap_usd", deserialize_with = "null_as_empty")]
    pub market_cap_usd: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub available_supply: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub total_supply: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub max_supply: String,

    #[serde(rename = "percent_change_1h", deserialize_with = "null_as_empty")]
    pub change_1h: String,

    #[serde(rename = "percent_change_24h", deserialize_with = "null_as_empty")]
    pub change_24h: String,

    #[serde(rename = "percent_change_7d", deserialize_with = "null_as_empty")]
    pub change_7d: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub last_updated: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
