//! Indicator computations over the sample history.
//!
//! Every public computation clones the history under a read lock and works
//! on that snapshot, so a writer appending samples concurrently can never
//! corrupt a calculation in flight. Recomputation is from scratch each
//! call, O(window) per indicator; fine at the default 1000-sample window
//! and ~1 Hz refresh, a ceiling to revisit if either grows.

use common::decimal::{mean, population_std_dev, population_variance, sqrt_newton};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::history::{PriceHistory, PriceSample};

/// Annualization factor: minutes per year, assuming ~1-minute sampling
/// cadence. A documented approximation, not a measured rate.
const MINUTES_PER_YEAR: Decimal = Decimal::from_parts(525_600, 0, 0, false, 0);

/// Window and threshold parameters for the indicator family.
#[derive(Debug, Clone)]
pub struct IndicatorConfig {
    pub atr_periods: usize,
    pub bollinger_periods: usize,
    pub bollinger_multiplier: Decimal,
    pub velocity_periods: usize,
    pub historical_periods: usize,
    pub spike_short_periods: usize,
    pub spike_long_periods: usize,
    pub spike_threshold: Decimal,
    pub percentile_lookback: usize,
    pub percentile_current: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            atr_periods: 14,
            bollinger_periods: 20,
            bollinger_multiplier: Decimal::TWO,
            velocity_periods: 5,
            historical_periods: 30,
            spike_short_periods: 5,
            spike_long_periods: 20,
            spike_threshold: Decimal::new(15, 1),
            percentile_lookback: 100,
            percentile_current: 14,
        }
    }
}

/// Short-term vs long-term ATR comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolatilitySpike {
    pub is_spike: bool,
    pub short_term_atr: Decimal,
    pub long_term_atr: Decimal,
}

impl VolatilitySpike {
    fn none() -> Self {
        Self {
            is_spike: false,
            short_term_atr: Decimal::ZERO,
            long_term_atr: Decimal::ZERO,
        }
    }
}

/// All six indicator values, computed together from one history snapshot.
#[derive(Debug, Clone)]
pub struct VolatilitySnapshot {
    pub atr: Decimal,
    pub percentile: Decimal,
    pub velocity: Decimal,
    pub bollinger_width: Decimal,
    pub spike: VolatilitySpike,
    pub historical: Decimal,
}

/// Bounded sample history plus the indicator computations over it.
///
/// Appends take the write lock briefly; computations clone the history
/// under the read lock and release it before doing any arithmetic.
#[derive(Debug)]
pub struct VolatilityAnalytics {
    history: RwLock<PriceHistory>,
}

impl VolatilityAnalytics {
    /// Creates an analytics engine retaining at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            history: RwLock::new(PriceHistory::new(capacity)),
        }
    }

    /// Appends a sample, evicting the oldest when at capacity.
    pub fn record(&self, price: Decimal, timestamp_ms: i64, volume: Decimal) {
        self.history
            .write()
            .push(PriceSample::new(price, timestamp_ms, volume));
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.history.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all samples (instrument change).
    pub fn clear(&self) {
        self.history.write().clear();
    }

    fn snapshot(&self) -> Vec<PriceSample> {
        self.history.read().snapshot()
    }

    /// Mean absolute price move over the most recent `periods` pairs.
    ///
    /// Single-price proxy for the classical high/low/close true range;
    /// this feed has only one price per sample.
    pub fn average_true_range(&self, periods: usize) -> Decimal {
        atr(&self.snapshot(), periods)
    }

    /// Bollinger band width `2k * sigma / SMA` over the most recent
    /// `periods` prices. Zero when the SMA is zero.
    pub fn bollinger_band_width(&self, periods: usize, multiplier: Decimal) -> Decimal {
        bollinger_band_width(&self.snapshot(), periods, multiplier)
    }

    /// Price change per second between the last sample and the one
    /// `periods` back. Zero when no time elapsed between them.
    pub fn price_velocity(&self, periods: usize) -> Decimal {
        price_velocity(&self.snapshot(), periods)
    }

    /// Annualized volatility of simple returns over the most recent
    /// `periods` samples (525600 minutes/year, assuming 1-minute cadence).
    pub fn historical_volatility(&self, periods: usize) -> Decimal {
        historical_volatility(&self.snapshot(), periods)
    }

    /// Flags a spike when short-term ATR exceeds long-term ATR by more
    /// than `threshold`. Both ATRs come back for display either way.
    pub fn detect_spike(&self, short: usize, long: usize, threshold: Decimal) -> VolatilitySpike {
        detect_spike(&self.snapshot(), short, long, threshold)
    }

    /// Percentage of historical sliding-window ATRs strictly below the
    /// current ATR. Zero-valued historical ATRs are excluded; zero when
    /// the distribution is empty.
    pub fn volatility_percentile(&self, lookback: usize, current: usize) -> Decimal {
        volatility_percentile(&self.snapshot(), lookback, current)
    }

    /// Computes all six indicators from a single history snapshot.
    pub fn indicators(&self, config: &IndicatorConfig) -> VolatilitySnapshot {
        let data = self.snapshot();
        VolatilitySnapshot {
            atr: atr(&data, config.atr_periods),
            percentile: volatility_percentile(
                &data,
                config.percentile_lookback,
                config.percentile_current,
            ),
            velocity: price_velocity(&data, config.velocity_periods),
            bollinger_width: bollinger_band_width(
                &data,
                config.bollinger_periods,
                config.bollinger_multiplier,
            ),
            spike: detect_spike(
                &data,
                config.spike_short_periods,
                config.spike_long_periods,
                config.spike_threshold,
            ),
            historical: historical_volatility(&data, config.historical_periods),
        }
    }
}

fn atr(data: &[PriceSample], periods: usize) -> Decimal {
    if periods == 0 || data.len() < periods + 1 {
        return Decimal::ZERO;
    }

    let start = data.len() - periods;
    let mut sum = Decimal::ZERO;
    for i in start..data.len() {
        sum += (data[i].price - data[i - 1].price).abs();
    }
    sum / Decimal::from(periods)
}

/// ATR over an arbitrary window: mean of its `len - 1` consecutive moves.
fn window_atr(window: &[PriceSample]) -> Decimal {
    if window.len() < 2 {
        return Decimal::ZERO;
    }

    let mut sum = Decimal::ZERO;
    for i in 1..window.len() {
        sum += (window[i].price - window[i - 1].price).abs();
    }
    sum / Decimal::from(window.len() - 1)
}

fn bollinger_band_width(data: &[PriceSample], periods: usize, multiplier: Decimal) -> Decimal {
    if periods == 0 || data.len() < periods {
        return Decimal::ZERO;
    }

    let prices: Vec<Decimal> = data[data.len() - periods..]
        .iter()
        .map(|s| s.price)
        .collect();

    let sma = mean(&prices);
    if sma.is_zero() {
        return Decimal::ZERO;
    }

    let std_dev = population_std_dev(&prices, sma);
    // (upper - lower) / SMA with bands at SMA +/- k*sigma.
    Decimal::TWO * multiplier * std_dev / sma
}

fn price_velocity(data: &[PriceSample], periods: usize) -> Decimal {
    if periods == 0 || data.len() < periods + 1 {
        return Decimal::ZERO;
    }

    let current = &data[data.len() - 1];
    let past = &data[data.len() - 1 - periods];

    let elapsed_ms = current.timestamp_ms - past.timestamp_ms;
    if elapsed_ms == 0 {
        return Decimal::ZERO;
    }

    let elapsed_secs = Decimal::from(elapsed_ms) / Decimal::ONE_THOUSAND;
    (current.price - past.price) / elapsed_secs
}

fn historical_volatility(data: &[PriceSample], periods: usize) -> Decimal {
    if periods == 0 || data.len() < periods + 1 {
        return Decimal::ZERO;
    }

    let mut returns = Vec::with_capacity(periods);
    for i in data.len() - periods..data.len() {
        let previous = data[i - 1].price;
        if !previous.is_zero() {
            returns.push(data[i].price / previous - Decimal::ONE);
        }
    }

    if returns.is_empty() {
        return Decimal::ZERO;
    }

    let mean_return = mean(&returns);
    let variance = population_variance(&returns, mean_return);
    sqrt_newton(variance * MINUTES_PER_YEAR)
}

fn detect_spike(
    data: &[PriceSample],
    short: usize,
    long: usize,
    threshold: Decimal,
) -> VolatilitySpike {
    if data.len() < long {
        return VolatilitySpike::none();
    }

    let short_term_atr = atr(data, short);
    let long_term_atr = atr(data, long);

    if long_term_atr.is_zero() {
        // Ratio undefined: report the ATRs but never a spike.
        return VolatilitySpike {
            is_spike: false,
            short_term_atr,
            long_term_atr,
        };
    }

    VolatilitySpike {
        is_spike: short_term_atr / long_term_atr > threshold,
        short_term_atr,
        long_term_atr,
    }
}

fn volatility_percentile(data: &[PriceSample], lookback: usize, current: usize) -> Decimal {
    if current == 0 || data.len() < lookback {
        return Decimal::ZERO;
    }

    let mut historical = Vec::new();
    for i in current..data.len().min(lookback) {
        let value = window_atr(&data[i - current..i]);
        if value > Decimal::ZERO {
            historical.push(value);
        }
    }

    if historical.is_empty() {
        return Decimal::ZERO;
    }

    let current_atr = atr(data, current);
    let below = historical.iter().filter(|v| **v < current_atr).count();

    Decimal::from(below) / Decimal::from(historical.len()) * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const MINUTE_MS: i64 = 60_000;

    fn analytics_with_prices(prices: &[Decimal]) -> VolatilityAnalytics {
        let analytics = VolatilityAnalytics::new(1000);
        for (i, price) in prices.iter().enumerate() {
            analytics.record(*price, i as i64 * MINUTE_MS, Decimal::ONE);
        }
        analytics
    }

    #[test]
    fn test_atr_known_sequence() {
        // |101-100|, |99-101|, |102-99| -> (1 + 2 + 3) / 3 = 2
        let analytics =
            analytics_with_prices(&[dec!(100), dec!(101), dec!(99), dec!(102)]);
        assert_eq!(analytics.average_true_range(3), dec!(2));
    }

    #[test]
    fn test_atr_insufficient_history() {
        let analytics = analytics_with_prices(&[dec!(100), dec!(101), dec!(99)]);
        // Needs periods + 1 samples.
        assert_eq!(analytics.average_true_range(3), Decimal::ZERO);
        assert_eq!(analytics.average_true_range(0), Decimal::ZERO);
    }

    #[test]
    fn test_bollinger_width_flat_prices() {
        let analytics = analytics_with_prices(&[dec!(100); 20]);
        assert_eq!(
            analytics.bollinger_band_width(20, Decimal::TWO),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_bollinger_width_known_values() {
        // Prices 2, 4, 6: SMA 4, population sigma sqrt(8/3).
        // Width = 2 * 2 * sigma / 4 = sigma.
        let analytics = analytics_with_prices(&[dec!(2), dec!(4), dec!(6)]);
        let width = analytics.bollinger_band_width(3, Decimal::TWO);
        assert!((width - dec!(1.6329931)).abs() < dec!(0.001));
    }

    #[test]
    fn test_bollinger_zero_sma_guard() {
        let analytics = analytics_with_prices(&[dec!(-1), dec!(0), dec!(1)]);
        assert_eq!(
            analytics.bollinger_band_width(3, Decimal::TWO),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_price_velocity() {
        // +2 per minute-spaced sample over 5 periods = 10 over 300 seconds.
        let prices: Vec<Decimal> = (0..6).map(|i| Decimal::from(100 + 2 * i)).collect();
        let analytics = analytics_with_prices(&prices);

        let velocity = analytics.price_velocity(5);
        assert!((velocity - dec!(0.0333333)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_price_velocity_zero_elapsed() {
        let analytics = VolatilityAnalytics::new(1000);
        for price in [dec!(100), dec!(101), dec!(102)] {
            analytics.record(price, 1_000, Decimal::ONE);
        }
        assert_eq!(analytics.price_velocity(2), Decimal::ZERO);
    }

    #[test]
    fn test_historical_volatility_flat_is_zero() {
        let analytics = analytics_with_prices(&[dec!(100); 31]);
        assert_eq!(analytics.historical_volatility(30), Decimal::ZERO);
    }

    #[test]
    fn test_historical_volatility_positive_for_moving_prices() {
        let prices: Vec<Decimal> = (0..31)
            .map(|i| if i % 2 == 0 { dec!(100) } else { dec!(102) })
            .collect();
        let analytics = analytics_with_prices(&prices);

        let vol = analytics.historical_volatility(30);
        assert!(vol > Decimal::ZERO);
    }

    #[test]
    fn test_historical_volatility_skips_zero_price_predecessor() {
        // A zero predecessor never divides; its return is dropped and the
        // remaining returns still produce a value.
        let analytics =
            analytics_with_prices(&[dec!(0), dec!(100), dec!(110), dec!(100)]);
        let vol = analytics.historical_volatility(3);
        assert!(vol > Decimal::ZERO);

        // All predecessors zero: no returns at all, neutral result.
        let analytics = analytics_with_prices(&[dec!(0), dec!(0), dec!(0), dec!(0)]);
        assert_eq!(analytics.historical_volatility(3), Decimal::ZERO);
    }

    #[test]
    fn test_historical_volatility_insufficient_history() {
        let analytics = analytics_with_prices(&[dec!(100), dec!(101)]);
        assert_eq!(analytics.historical_volatility(30), Decimal::ZERO);
    }

    #[test]
    fn test_spike_detected_after_calm_period() {
        // 20 flat samples, then 5 oscillating +/-10.
        let mut prices = vec![dec!(100); 20];
        prices.extend([dec!(110), dec!(100), dec!(110), dec!(100), dec!(110)]);
        let analytics = analytics_with_prices(&prices);

        let spike = analytics.detect_spike(5, 20, dec!(1.5));
        assert!(spike.is_spike);
        assert_eq!(spike.short_term_atr, dec!(10));
        assert_eq!(spike.long_term_atr, dec!(2.5));
    }

    #[test]
    fn test_no_spike_when_flat() {
        let analytics = analytics_with_prices(&[dec!(100); 25]);
        let spike = analytics.detect_spike(5, 20, dec!(1.5));

        // Long-term ATR is zero: ratio undefined, never a spike.
        assert!(!spike.is_spike);
        assert_eq!(spike.long_term_atr, Decimal::ZERO);
    }

    #[test]
    fn test_no_spike_with_insufficient_history() {
        let analytics = analytics_with_prices(&[dec!(100), dec!(120)]);
        let spike = analytics.detect_spike(5, 20, dec!(1.5));
        assert!(!spike.is_spike);
        assert_eq!(spike.short_term_atr, Decimal::ZERO);
    }

    #[test]
    fn test_percentile_recent_volatility_ranks_high() {
        let prices = [
            dec!(100),
            dec!(100),
            dec!(100),
            dec!(100),
            dec!(100),
            dec!(100),
            dec!(100),
            dec!(105),
            dec!(95),
            dec!(110),
        ];
        let analytics = analytics_with_prices(&prices);

        // Historical window ATRs: two non-zero values (2.5 and 7.5), both
        // below the current ATR(3) of 10.
        assert_eq!(analytics.volatility_percentile(10, 3), dec!(100));
    }

    #[test]
    fn test_percentile_empty_distribution() {
        let analytics = analytics_with_prices(&[dec!(100); 10]);
        assert_eq!(analytics.volatility_percentile(10, 3), Decimal::ZERO);
    }

    #[test]
    fn test_percentile_insufficient_history() {
        let analytics = analytics_with_prices(&[dec!(100), dec!(105)]);
        assert_eq!(analytics.volatility_percentile(10, 3), Decimal::ZERO);
    }

    #[test]
    fn test_capacity_eviction_affects_indicators() {
        let analytics = VolatilityAnalytics::new(4);
        for (i, price) in [dec!(50), dec!(100), dec!(101), dec!(99), dec!(102)]
            .iter()
            .enumerate()
        {
            analytics.record(*price, i as i64 * MINUTE_MS, Decimal::ONE);
        }

        // The 50 was evicted; ATR(3) sees 100, 101, 99, 102.
        assert_eq!(analytics.len(), 4);
        assert_eq!(analytics.average_true_range(3), dec!(2));
    }

    #[test]
    fn test_clear_resets_history() {
        let analytics = analytics_with_prices(&[dec!(100), dec!(101), dec!(99), dec!(102)]);
        analytics.clear();
        assert!(analytics.is_empty());
        assert_eq!(analytics.average_true_range(3), Decimal::ZERO);
    }

    #[test]
    fn test_aggregate_snapshot_cold_start() {
        let analytics = VolatilityAnalytics::new(1000);
        let snap = analytics.indicators(&IndicatorConfig::default());

        assert_eq!(snap.atr, Decimal::ZERO);
        assert_eq!(snap.percentile, Decimal::ZERO);
        assert_eq!(snap.velocity, Decimal::ZERO);
        assert_eq!(snap.bollinger_width, Decimal::ZERO);
        assert_eq!(snap.historical, Decimal::ZERO);
        assert!(!snap.spike.is_spike);
    }

    #[test]
    fn test_aggregate_snapshot_matches_individual_indicators() {
        let prices: Vec<Decimal> = (0..120)
            .map(|i| Decimal::from(100 + (i % 7)))
            .collect();
        let analytics = analytics_with_prices(&prices);
        let config = IndicatorConfig::default();

        let snap = analytics.indicators(&config);
        assert_eq!(snap.atr, analytics.average_true_range(config.atr_periods));
        assert_eq!(
            snap.percentile,
            analytics
                .volatility_percentile(config.percentile_lookback, config.percentile_current)
        );
        assert_eq!(
            snap.historical,
            analytics.historical_volatility(config.historical_periods)
        );
    }
}
