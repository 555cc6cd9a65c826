//! Order book implementation with sorted price levels.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::str::FromStr;

use common::decimal::round_half_up;
use rust_decimal::Decimal;
use tracing::warn;

use crate::error::OrderBookError;
use crate::level::PriceLevel;

/// Fractional digits for the mid price, matching the feed's quote precision.
const MID_PRICE_SCALE: u32 = 2;

/// Result of applying a depth batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Batch applied; `skipped_entries` counts unparseable entries dropped.
    Applied { skipped_entries: usize },
    /// Batch was older than the current book state and was ignored.
    Stale,
}

/// Local order book maintaining sorted bid and ask levels.
///
/// Uses `BTreeMap` with `Decimal` keys for precise price level tracking.
/// - Bids use `Reverse<Decimal>` for descending order (highest first)
/// - Asks use `Decimal` directly for ascending order (lowest first)
///
/// Neither side ever stores a zero-quantity level: a zero quantity in a
/// batch is the feed's removal sentinel.
#[derive(Debug)]
pub struct OrderBook {
    symbol: String,
    /// Bids stored with Reverse<Decimal> keys for descending order.
    /// Iteration yields highest price first.
    bids: BTreeMap<Reverse<Decimal>, Decimal>,
    /// Asks stored with Decimal keys for ascending order.
    /// Iteration yields lowest price first.
    asks: BTreeMap<Decimal, Decimal>,
    /// Final update id of the last applied batch, for gap detection.
    last_update_id: Option<u64>,
}

impl OrderBook {
    /// Creates a new empty order book for the given symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            last_update_id: None,
        }
    }

    /// Returns the symbol this order book tracks.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the final update id of the last applied batch.
    pub fn last_update_id(&self) -> Option<u64> {
        self.last_update_id
    }

    /// Applies one diff batch of raw `(price, quantity)` string pairs.
    ///
    /// Each entry is parsed as an exact decimal. An entry that fails to
    /// parse is logged and skipped; the rest of the batch still applies.
    /// A zero quantity removes the level (removing an absent level is a
    /// no-op). Bid and ask entries apply together as one unit under the
    /// caller's `&mut` borrow.
    ///
    /// The first batch after construction (or [`clear`](Self::clear)) is
    /// always accepted. After that, a batch whose `first_update_id` is not
    /// contiguous with the last applied `final_update_id` is rejected with
    /// [`OrderBookError::SequenceGap`] and the book is left untouched, so
    /// the caller can resynchronize. Batches entirely behind the current
    /// state are dropped as [`ApplyOutcome::Stale`].
    pub fn apply_update(
        &mut self,
        bids: &[(String, String)],
        asks: &[(String, String)],
        first_update_id: u64,
        final_update_id: u64,
    ) -> Result<ApplyOutcome, OrderBookError> {
        if let Some(last_id) = self.last_update_id {
            if final_update_id <= last_id {
                return Ok(ApplyOutcome::Stale);
            }
            if first_update_id > last_id + 1 {
                warn!(
                    symbol = %self.symbol,
                    expected = last_id + 1,
                    got = first_update_id,
                    "sequence gap detected"
                );
                return Err(OrderBookError::SequenceGap {
                    expected: last_id + 1,
                    actual: first_update_id,
                });
            }
        }

        let mut skipped = 0usize;

        for (price, quantity) in bids {
            match parse_entry(price, quantity) {
                Some((price, quantity)) => {
                    if quantity.is_zero() {
                        self.bids.remove(&Reverse(price));
                    } else {
                        self.bids.insert(Reverse(price), quantity);
                    }
                }
                None => {
                    warn!(symbol = %self.symbol, price = %price, quantity = %quantity, "skipping unparseable bid entry");
                    skipped += 1;
                }
            }
        }

        for (price, quantity) in asks {
            match parse_entry(price, quantity) {
                Some((price, quantity)) => {
                    if quantity.is_zero() {
                        self.asks.remove(&price);
                    } else {
                        self.asks.insert(price, quantity);
                    }
                }
                None => {
                    warn!(symbol = %self.symbol, price = %price, quantity = %quantity, "skipping unparseable ask entry");
                    skipped += 1;
                }
            }
        }

        self.last_update_id = Some(final_update_id);

        if self.is_crossed() {
            warn!(
                symbol = %self.symbol,
                bid = %self.best_bid().map(|l| l.price).unwrap_or_default(),
                ask = %self.best_ask().map(|l| l.price).unwrap_or_default(),
                "book is crossed, feed may be desynchronized"
            );
        }

        Ok(ApplyOutcome::Applied {
            skipped_entries: skipped,
        })
    }

    /// Returns the best (highest) bid price level.
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids
            .iter()
            .next()
            .map(|(Reverse(price), qty)| PriceLevel::new(*price, *qty))
    }

    /// Returns the best (lowest) ask price level.
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks
            .iter()
            .next()
            .map(|(price, qty)| PriceLevel::new(*price, *qty))
    }

    /// Returns the mid price, rounded half-up to two fractional digits.
    pub fn mid_price(&self) -> Option<Decimal> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some(round_half_up(
            (bid.price + ask.price) / Decimal::TWO,
            MID_PRICE_SCALE,
        ))
    }

    /// Returns the spread (best ask - best bid).
    pub fn spread(&self) -> Option<Decimal> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some(ask.price - bid.price)
    }

    /// Returns the spread as a fraction of the mid price.
    ///
    /// `None` when either side is empty or the mid price is zero.
    pub fn spread_percent(&self) -> Option<Decimal> {
        let spread = self.spread()?;
        let mid = self.mid_price()?;
        if mid.is_zero() {
            return None;
        }
        Some(spread / mid)
    }

    /// Returns the top N bid price levels (highest to lowest).
    pub fn top_bids(&self, n: usize) -> Vec<PriceLevel> {
        self.bids
            .iter()
            .take(n)
            .map(|(Reverse(price), qty)| PriceLevel::new(*price, *qty))
            .collect()
    }

    /// Returns the top N ask price levels (lowest to highest).
    pub fn top_asks(&self, n: usize) -> Vec<PriceLevel> {
        self.asks
            .iter()
            .take(n)
            .map(|(price, qty)| PriceLevel::new(*price, *qty))
            .collect()
    }

    /// Returns whether best bid >= best ask while both sides are populated.
    ///
    /// A crossed book is representable (it signals upstream desync) but is
    /// logged when a batch produces it.
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid.price >= ask.price,
            _ => false,
        }
    }

    /// Returns the total number of bid levels.
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Returns the total number of ask levels.
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    /// Clears all levels and resets sequence tracking.
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.last_update_id = None;
    }
}

/// Parses one raw entry; `None` if either field is not a valid decimal.
fn parse_entry(price: &str, quantity: &str) -> Option<(Decimal, Decimal)> {
    let price = Decimal::from_str(price).ok()?;
    let quantity = Decimal::from_str(quantity).ok()?;
    Some((price, quantity))
}
