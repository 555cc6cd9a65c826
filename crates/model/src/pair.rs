//! Trading pair identity and derived stream addresses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// WebSocket base URL for Binance market data streams.
const WS_BASE_URL: &str = "wss://stream.binance.com:9443";

/// An instrument identified by its base and quote assets.
///
/// Assets are normalized to uppercase; the subscription symbol is the
/// lowercase concatenation the stream endpoints expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingPair {
    base: String,
    quote: String,
    symbol: String,
}

impl TradingPair {
    pub fn new(base: impl AsRef<str>, quote: impl AsRef<str>) -> Self {
        let base = base.as_ref().to_uppercase();
        let quote = quote.as_ref().to_uppercase();
        let symbol = format!("{}{}", base, quote).to_lowercase();
        Self {
            base,
            quote,
            symbol,
        }
    }

    pub fn base_asset(&self) -> &str {
        &self.base
    }

    pub fn quote_asset(&self) -> &str {
        &self.quote
    }

    /// Lowercase subscription symbol, e.g. `btcusdt`.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Uppercase feed symbol, e.g. `BTCUSDT`.
    pub fn feed_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }

    /// Stream address for the incremental depth feed.
    pub fn depth_stream_url(&self) -> String {
        format!("{}/ws/{}@depth", WS_BASE_URL, self.symbol)
    }

    /// Stream address for the trade feed.
    pub fn trade_stream_url(&self) -> String {
        format!("{}/ws/{}@trade", WS_BASE_URL, self.symbol)
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
