use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::{metrics::DerivedMetric, quote::TickerQuote};

const FALLBACK: &str = "Cryptocurrency Price";
const FOOTER: &str = "YachtBot";

//
// Slack message attachment
// https://api.slack.com/reference/messaging/attachments
//
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub fallback: String,
    pub color: String,
    pub title: String,
    pub title_link: String,
    pub fields: Vec<Field>,
    pub footer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl Field {
    fn short(title: &str, value: String) -> Self {
        Self {
            title: title.to_string(),
            value,
            short: true,
        }
    }
}

/// Build the price card for one coin.
pub fn present(quote: &TickerQuote, metric: &DerivedMetric) -> Attachment {
    Attachment {
        fallback: FALLBACK.to_string(),
        color: metric.band.color().to_string(),
        title: format!(
            "Price of {} - ${} {}",
            quote.name,
            quote.symbol,
            metric.band.emoji()
        ),
        title_link: format!("https://coinmarketcap.com/currencies/{}/", quote.id),
        fields: vec![
            Field::short("Price USD", currency(metric.price_usd)),
            Field::short("Price BTC", quote.price_btc.clone()),
            Field::short(
                "24H Change",
                format!("{} ({}%)", currency(metric.delta_24h), quote.change_24h),
            ),
            Field::short(
                "7D Change",
                format!("{} ({}%)", currency(metric.delta_7d), quote.change_7d),
            ),
        ],
        footer: FOOTER.to_string(),
        ts: quote.last_updated.trim().parse().ok(),
    }
}

/// Dollar amount to cents, with the sign ahead of the dollar sign: `-$123.46`.
pub fn currency(value: Decimal) -> String {
    let mut cents = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    cents.rescale(2);

    if cents.is_sign_negative() && !cents.is_zero() {
        format!("-${}", cents.abs())
    } else {
        format!("${}", cents.abs())
    }
}
