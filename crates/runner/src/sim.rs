//! Random-walk depth feed simulator.
//!
//! Stands in for the decoded-feed collaborator: produces the same
//! `DepthUpdate`/`Trade` events a live depth stream would, with contiguous
//! update ids, occasional level removals and the odd malformed entry so
//! the skip path gets exercised.

use model::{DepthUpdate, MakerSide, Trade, TradingPair};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Price levels emitted per side per batch.
const LEVELS_PER_SIDE: i64 = 5;

pub struct FeedSimulator {
    symbol: String,
    rng: StdRng,
    mid: Decimal,
    tick: Decimal,
    next_update_id: u64,
    next_trade_id: u64,
}

impl FeedSimulator {
    pub fn new(pair: &TradingPair, start_mid: Decimal) -> Self {
        Self {
            symbol: pair.feed_symbol(),
            rng: StdRng::from_entropy(),
            mid: start_mid,
            tick: dec!(0.01),
            next_update_id: 1,
            next_trade_id: 1,
        }
    }

    /// One depth batch around the drifting mid.
    pub fn next_depth(&mut self, timestamp_ms: i64) -> DepthUpdate {
        // Random walk: up to +/- 5 ticks per batch.
        let drift = self.rng.gen_range(-5..=5);
        self.mid += self.tick * Decimal::from(drift);

        let mut bids = Vec::new();
        let mut asks = Vec::new();

        for i in 1..=LEVELS_PER_SIDE {
            let offset = self.tick * Decimal::from(i);
            bids.push((self.fmt_price(self.mid - offset), self.quantity()));
            asks.push((self.fmt_price(self.mid + offset), self.quantity()));
        }

        // Occasionally prune a deep level, and rarely emit garbage so the
        // per-entry skip path is exercised end to end.
        if self.rng.gen_bool(0.3) {
            let offset = self.tick * Decimal::from(self.rng.gen_range(6..12));
            bids.push((self.fmt_price(self.mid - offset), "0".to_string()));
        }
        if self.rng.gen_bool(0.02) {
            bids.push(("garbled".to_string(), "1.0".to_string()));
        }

        let first_update_id = self.next_update_id;
        let final_update_id = first_update_id + (bids.len() + asks.len()) as u64 - 1;
        self.next_update_id = final_update_id + 1;

        DepthUpdate {
            symbol: self.symbol.clone(),
            first_update_id,
            final_update_id,
            bids,
            asks,
            timestamp_ms,
        }
    }

    /// One trade at or near the current mid.
    pub fn next_trade(&mut self, timestamp_ms: i64) -> Trade {
        let trade_id = self.next_trade_id;
        self.next_trade_id += 1;

        let jitter = self.tick * Decimal::from(self.rng.gen_range(-1..=1));
        Trade {
            symbol: self.symbol.clone(),
            price: self.mid + jitter,
            qty: Decimal::new(self.rng.gen_range(1..500), 3),
            trade_id,
            timestamp_ms,
            maker_side: MakerSide::from_buyer_maker(self.rng.gen_bool(0.5)),
        }
    }

    fn quantity(&mut self) -> String {
        Decimal::new(self.rng.gen_range(10..5000), 3).to_string()
    }

    fn fmt_price(&self, price: Decimal) -> String {
        format!("{:.2}", price)
    }
}
