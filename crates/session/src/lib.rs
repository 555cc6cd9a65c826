//! Per-instrument market session.
//!
//! A [`MarketSession`] owns one order book and one volatility history for
//! the subscribed trading pair, routes decoded feed events into them, and
//! answers the pull-based view queries the display layer renders. On an
//! instrument change the whole state is discarded and rebuilt.

mod view;

pub use view::{BookView, MarketSummary};

use metrics::SharedMetrics;
use model::{DepthUpdate, MarketEvent, TradingPair};
use orderbook::{ApplyOutcome, OrderBook, OrderBookError};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use volatility::{IndicatorConfig, VolatilityAnalytics, VolatilitySnapshot};

/// Session tuning knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Retained mid-price samples.
    pub history_capacity: usize,
    /// Levels per side in the book view.
    pub view_depth: usize,
    pub indicators: IndicatorConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_capacity: 1000,
            view_depth: 10,
            indicators: IndicatorConfig::default(),
        }
    }
}

/// Owns the book and analytics for one subscribed instrument.
///
/// Batch application takes the book's write lock, so readers going through
/// [`summary`](Self::summary) or [`book_view`](Self::book_view) see either
/// the state before a batch or after it, never in between.
pub struct MarketSession {
    pair: RwLock<TradingPair>,
    book: RwLock<OrderBook>,
    analytics: VolatilityAnalytics,
    config: SessionConfig,
    metrics: SharedMetrics,
}

impl MarketSession {
    pub fn new(pair: TradingPair, config: SessionConfig, metrics: SharedMetrics) -> Self {
        let book = OrderBook::new(pair.feed_symbol());
        let analytics = VolatilityAnalytics::new(config.history_capacity);
        Self {
            pair: RwLock::new(pair),
            book: RwLock::new(book),
            analytics,
            config,
            metrics,
        }
    }

    /// Currently subscribed pair.
    pub fn pair(&self) -> TradingPair {
        self.pair.read().clone()
    }

    /// Routes one decoded feed event. Nothing here is fatal: bad data is
    /// counted, logged and dropped.
    pub fn handle_event(&self, event: &MarketEvent) {
        match event {
            MarketEvent::Trade(trade) => {
                debug!(symbol = %trade.symbol, price = %trade.price, "trade received");
                self.metrics.inc_trades_received();
            }
            MarketEvent::Depth(update) => self.apply_depth(update),
        }
    }

    /// Applies one depth batch and, when it leaves a two-sided book,
    /// records a mid-price sample stamped with the batch's event time.
    ///
    /// A sequence gap clears the book so it rebuilds from the next
    /// contiguous batch; the sample history is kept, the mid-price series
    /// just pauses until the book is two-sided again.
    pub fn apply_depth(&self, update: &DepthUpdate) {
        let expected_symbol = self.pair.read().feed_symbol();
        if update.symbol != expected_symbol {
            warn!(
                got = %update.symbol,
                expected = %expected_symbol,
                "dropping depth batch for wrong instrument"
            );
            self.metrics.inc_decode_errors();
            return;
        }

        let mid = {
            let mut book = self.book.write();
            match book.apply_update(
                &update.bids,
                &update.asks,
                update.first_update_id,
                update.final_update_id,
            ) {
                Ok(ApplyOutcome::Applied { skipped_entries }) => {
                    self.metrics.inc_depth_batches_applied();
                    self.metrics.add_entry_parse_skips(skipped_entries as u64);
                    book.mid_price()
                }
                Ok(ApplyOutcome::Stale) => {
                    self.metrics.inc_stale_batches_dropped();
                    None
                }
                Err(OrderBookError::SequenceGap { .. }) => {
                    self.metrics.inc_sequence_gaps();
                    book.clear();
                    None
                }
            }
        };

        if let Some(mid) = mid {
            self.analytics.record(mid, update.timestamp_ms, Decimal::ONE);
            self.metrics.inc_samples_recorded();
        }
    }

    /// Top levels per side, best-first.
    pub fn book_view(&self) -> BookView {
        let book = self.book.read();
        BookView {
            bids: book.top_bids(self.config.view_depth),
            asks: book.top_asks(self.config.view_depth),
        }
    }

    /// Best bid/ask and the derived mid, spread and spread percent.
    pub fn summary(&self) -> MarketSummary {
        let book = self.book.read();
        MarketSummary {
            best_bid: book.best_bid(),
            best_ask: book.best_ask(),
            mid_price: book.mid_price(),
            spread: book.spread(),
            spread_percent: book.spread_percent(),
        }
    }

    /// All six indicators from one history snapshot.
    pub fn volatility(&self) -> VolatilitySnapshot {
        self.analytics.indicators(&self.config.indicators)
    }

    /// Number of retained mid-price samples.
    pub fn sample_count(&self) -> usize {
        self.analytics.len()
    }

    /// Switches instrument: the book and sample history are discarded and
    /// recreated empty. No cross-instrument merging ever happens.
    pub fn reset(&self, pair: TradingPair) {
        info!(pair = %pair, "switching instrument, discarding session state");
        let mut current = self.pair.write();
        let mut book = self.book.write();
        *book = OrderBook::new(pair.feed_symbol());
        self.analytics.clear();
        *current = pair;
    }
}
