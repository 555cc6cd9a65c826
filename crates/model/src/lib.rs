//! Shared market-data types for the depth view.

mod pair;

pub use pair::TradingPair;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of a trade was the resting (maker) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MakerSide {
    Buyer,
    Seller,
}

impl MakerSide {
    /// Maps the feed's `is_buyer_maker` flag onto a side.
    pub fn from_buyer_maker(is_buyer_maker: bool) -> Self {
        if is_buyer_maker {
            MakerSide::Buyer
        } else {
            MakerSide::Seller
        }
    }
}

/// A single executed trade, already decoded from the wire.
///
/// Display-only: trades never feed order book state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub price: Decimal,
    pub qty: Decimal,
    pub trade_id: u64,
    pub timestamp_ms: i64,
    pub maker_side: MakerSide,
}

/// One incremental depth batch as extracted from the wire payload.
///
/// Price/quantity pairs are kept as the raw strings the feed sent; the
/// order book parses them entry by entry so a single bad value only
/// drops that entry, not the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthUpdate {
    pub symbol: String,
    pub first_update_id: u64,
    pub final_update_id: u64,
    pub bids: Vec<(String, String)>,
    pub asks: Vec<(String, String)>,
    pub timestamp_ms: i64,
}

/// Decoded market events flowing from the feed into the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MarketEvent {
    Trade(Trade),
    Depth(DepthUpdate),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maker_side_from_flag() {
        assert_eq!(MakerSide::from_buyer_maker(true), MakerSide::Buyer);
        assert_eq!(MakerSide::from_buyer_maker(false), MakerSide::Seller);
    }
}
