//! Outbound view types for the display layer.

use std::fmt;

use orderbook::PriceLevel;
use rust_decimal::Decimal;

/// Top-of-book levels per side, best-first.
#[derive(Debug, Clone)]
pub struct BookView {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

/// Best bid/ask and derived figures; `None` means "unavailable" (one or
/// both sides of the book are empty).
#[derive(Debug, Clone)]
pub struct MarketSummary {
    pub best_bid: Option<PriceLevel>,
    pub best_ask: Option<PriceLevel>,
    pub mid_price: Option<Decimal>,
    pub spread: Option<Decimal>,
    pub spread_percent: Option<Decimal>,
}

fn fmt_level(level: &Option<PriceLevel>) -> String {
    match level {
        Some(l) => l.to_string(),
        None => "--".to_string(),
    }
}

fn fmt_value(value: &Option<Decimal>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "--".to_string(),
    }
}

impl fmt::Display for MarketSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spread_pct = self
            .spread_percent
            .map(|p| format!("{:.3}%", p * Decimal::ONE_HUNDRED))
            .unwrap_or_else(|| "--".to_string());

        write!(
            f,
            "bid {} | ask {} | mid {} | spread {} ({})",
            fmt_level(&self.best_bid),
            fmt_level(&self.best_ask),
            fmt_value(&self.mid_price),
            fmt_value(&self.spread),
            spread_pct,
        )
    }
}
