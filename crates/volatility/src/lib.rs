//! Volatility analytics over a bounded mid-price history.
//!
//! [`VolatilityAnalytics`] keeps a fixed-capacity FIFO of price samples and
//! computes a family of indicators on demand. Writers append samples while
//! readers compute; every computation works on an immutable snapshot taken
//! under a short read lock, so neither side ever observes the other
//! mid-operation.
//!
//! Insufficient history is a cold-start condition, not an error: every
//! indicator degrades to zero (or a no-spike result).

mod history;
mod indicators;

pub use history::PriceSample;
pub use indicators::{IndicatorConfig, VolatilityAnalytics, VolatilitySnapshot, VolatilitySpike};
