//! Local order book built from an incremental depth feed.
//!
//! Price levels are kept in sorted `BTreeMap` structures keyed by
//! `Decimal` prices, so quote precision survives exactly as sent.
//! Updates arrive as raw string pairs; a single unparseable entry is
//! skipped while the rest of the batch still applies.
//!
//! # Example
//!
//! ```rust
//! use orderbook::OrderBook;
//!
//! let mut book = OrderBook::new("BTCUSDT");
//!
//! let bids = vec![("100.00".into(), "1.5".into()), ("99.50".into(), "2.0".into())];
//! let asks = vec![("100.50".into(), "1.0".into())];
//! book.apply_update(&bids, &asks, 1, 1).unwrap();
//!
//! println!("Best bid: {:?}", book.best_bid());
//! println!("Best ask: {:?}", book.best_ask());
//! println!("Mid price: {:?}", book.mid_price());
//! println!("Spread: {:?}", book.spread());
//! ```

mod book;
mod error;
mod level;

pub use book::{ApplyOutcome, OrderBook};
pub use error::OrderBookError;
pub use level::PriceLevel;
