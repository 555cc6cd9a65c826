use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Thread-safe counters for the depth-feed ingestion path.
#[derive(Debug)]
pub struct FeedMetrics {
    // Counters
    trades_received: AtomicU64,
    depth_batches_applied: AtomicU64,
    stale_batches_dropped: AtomicU64,
    entry_parse_skips: AtomicU64,
    decode_errors: AtomicU64,
    sequence_gaps: AtomicU64,
    samples_recorded: AtomicU64,

    // Timestamps
    inner: RwLock<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    start_time: Instant,
    last_update_time: Option<Instant>,
    last_error_time: Option<Instant>,
}

impl Default for FeedMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedMetrics {
    pub fn new() -> Self {
        Self {
            trades_received: AtomicU64::new(0),
            depth_batches_applied: AtomicU64::new(0),
            stale_batches_dropped: AtomicU64::new(0),
            entry_parse_skips: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            sequence_gaps: AtomicU64::new(0),
            samples_recorded: AtomicU64::new(0),
            inner: RwLock::new(MetricsInner {
                start_time: Instant::now(),
                last_update_time: None,
                last_error_time: None,
            }),
        }
    }

    // --- Increment methods ---

    pub fn inc_trades_received(&self) {
        self.trades_received.fetch_add(1, Ordering::Relaxed);
        self.inner.write().last_update_time = Some(Instant::now());
    }

    pub fn inc_depth_batches_applied(&self) {
        self.depth_batches_applied.fetch_add(1, Ordering::Relaxed);
        self.inner.write().last_update_time = Some(Instant::now());
    }

    pub fn inc_stale_batches_dropped(&self) {
        self.stale_batches_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_entry_parse_skips(&self, count: u64) {
        if count > 0 {
            self.entry_parse_skips.fetch_add(count, Ordering::Relaxed);
            self.inner.write().last_error_time = Some(Instant::now());
        }
    }

    pub fn inc_decode_errors(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
        self.inner.write().last_error_time = Some(Instant::now());
    }

    pub fn inc_sequence_gaps(&self) {
        self.sequence_gaps.fetch_add(1, Ordering::Relaxed);
        self.inner.write().last_error_time = Some(Instant::now());
    }

    pub fn inc_samples_recorded(&self) {
        self.samples_recorded.fetch_add(1, Ordering::Relaxed);
    }

    // --- Getter methods ---

    pub fn trades_received(&self) -> u64 {
        self.trades_received.load(Ordering::Relaxed)
    }

    pub fn depth_batches_applied(&self) -> u64 {
        self.depth_batches_applied.load(Ordering::Relaxed)
    }

    pub fn stale_batches_dropped(&self) -> u64 {
        self.stale_batches_dropped.load(Ordering::Relaxed)
    }

    pub fn entry_parse_skips(&self) -> u64 {
        self.entry_parse_skips.load(Ordering::Relaxed)
    }

    pub fn decode_errors(&self) -> u64 {
        self.decode_errors.load(Ordering::Relaxed)
    }

    pub fn sequence_gaps(&self) -> u64 {
        self.sequence_gaps.load(Ordering::Relaxed)
    }

    pub fn samples_recorded(&self) -> u64 {
        self.samples_recorded.load(Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> f64 {
        self.inner.read().start_time.elapsed().as_secs_f64()
    }

    pub fn secs_since_last_update(&self) -> Option<f64> {
        self.inner
            .read()
            .last_update_time
            .map(|t| t.elapsed().as_secs_f64())
    }

    pub fn secs_since_last_error(&self) -> Option<f64> {
        self.inner
            .read()
            .last_error_time
            .map(|t| t.elapsed().as_secs_f64())
    }

    /// Generate a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            trades_received: self.trades_received(),
            depth_batches_applied: self.depth_batches_applied(),
            stale_batches_dropped: self.stale_batches_dropped(),
            entry_parse_skips: self.entry_parse_skips(),
            decode_errors: self.decode_errors(),
            sequence_gaps: self.sequence_gaps(),
            samples_recorded: self.samples_recorded(),
            uptime_secs: self.uptime_secs(),
            secs_since_last_update: self.secs_since_last_update(),
            secs_since_last_error: self.secs_since_last_error(),
        }
    }
}

/// A point-in-time snapshot of feed metrics.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub trades_received: u64,
    pub depth_batches_applied: u64,
    pub stale_batches_dropped: u64,
    pub entry_parse_skips: u64,
    pub decode_errors: u64,
    pub sequence_gaps: u64,
    pub samples_recorded: u64,
    pub uptime_secs: f64,
    pub secs_since_last_update: Option<f64>,
    pub secs_since_last_error: Option<f64>,
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Feed Metrics ===")?;
        writeln!(f, "Uptime:            {:.1}s", self.uptime_secs)?;
        writeln!(f, "Trades received:   {}", self.trades_received)?;
        writeln!(f, "Batches applied:   {}", self.depth_batches_applied)?;
        writeln!(f, "Stale batches:     {}", self.stale_batches_dropped)?;
        writeln!(f, "Entry skips:       {}", self.entry_parse_skips)?;
        writeln!(f, "Decode errors:     {}", self.decode_errors)?;
        writeln!(f, "Sequence gaps:     {}", self.sequence_gaps)?;
        writeln!(f, "Samples recorded:  {}", self.samples_recorded)?;
        if let Some(secs) = self.secs_since_last_update {
            writeln!(f, "Since last update: {:.1}s", secs)?;
        }
        if let Some(secs) = self.secs_since_last_error {
            writeln!(f, "Since last error:  {:.1}s", secs)?;
        }
        Ok(())
    }
}

/// Shared handle to metrics.
pub type SharedMetrics = Arc<FeedMetrics>;

pub fn create_metrics() -> SharedMetrics {
    Arc::new(FeedMetrics::new())
}
