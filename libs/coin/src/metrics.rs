use std::str::FromStr;

use rust_decimal::Decimal;

use crate::{
    error::{Error, Result},
    quote::TickerQuote,
};

/// Presentation band picked from the 24h percent change.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Band {
    Collapse,
    Crash,
    Slide,
    Dip,
    Flat,
    Rally,
    Surge,
    Rocket,
    Moon,
}

// Upper bounds are exclusive and checked in order; anything past the last one is Moon.
const BANDS: [(i64, Band); 8] = [
    (-50, Band::Collapse),
    (-25, Band::Crash),
    (-10, Band::Slide),
    (0, Band::Dip),
    (25, Band::Flat),
    (50, Band::Rally),
    (100, Band::Surge),
    (1000, Band::Rocket),
];

impl Band {
    pub fn classify(pct_24h: Decimal) -> Self {
        BANDS
            .iter()
            .find(|(upper, _)| pct_24h < Decimal::from(*upper))
            .map(|(_, band)| *band)
            .unwrap_or(Band::Moon)
    }

    pub fn color(&self) -> &'static str {
        match self {
            Band::Collapse | Band::Crash => "#d7191c",
            Band::Slide => "#fdae61",
            Band::Dip | Band::Flat => "#FAD898",
            Band::Rally => "#a6d96a",
            Band::Surge | Band::Rocket => "#1a9641",
            Band::Moon => "#000000",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Band::Collapse => ":trash::fire:",
            Band::Crash => ":smoking:",
            Band::Slide => ":thinking_face:",
            Band::Dip => ":zzz:",
            Band::Flat => ":beers:",
            Band::Rally => ":champagne:",
            Band::Surge => ":racing_car:",
            Band::Rocket => ":motor_boat:",
            Band::Moon => ":full_moon_with_face:",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetric {
    pub price_usd: Decimal,
    pub delta_24h: Decimal,
    pub delta_7d: Decimal,
    pub band: Band,
}

/// Parse the price and change fields of a quote and turn the percentages into dollar moves.
pub fn derive(quote: &TickerQuote) -> Result<DerivedMetric> {
    let price_usd = parse_decimal("price_usd", &quote.price_usd)?;
    let pct_24h = parse_decimal("percent_change_24h", &quote.change_24h)?;
    let pct_7d = parse_decimal("percent_change_7d", &quote.change_7d)?;

    Ok(DerivedMetric {
        price_usd,
        delta_24h: dollar_difference("percent_change_24h", price_usd, pct_24h)?,
        delta_7d: dollar_difference("percent_change_7d", price_usd, pct_7d)?,
        band: Band::classify(pct_24h),
    })
}

/// `price - price / (1 + pct / 100)`: today's price minus the price the change started from.
/// A change of -100% or less has no starting price.
pub fn dollar_difference(field: &'static str, price: Decimal, pct: Decimal) -> Result<Decimal> {
    let invalid = || Error::Parse {
        field,
        value: pct.to_string(),
    };

    if pct <= -Decimal::ONE_HUNDRED {
        return Err(invalid());
    }

    let factor = Decimal::ONE
        .checked_add(pct / Decimal::ONE_HUNDRED)
        .ok_or_else(invalid)?;
    let previous = price.checked_div(factor).ok_or_else(invalid)?;

    price.checked_sub(previous).ok_or_else(invalid)
}

fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| Error::Parse {
            field,
            value: raw.to_string(),
        })
}
