//! Bounded FIFO of price samples.

use std::collections::VecDeque;

use rust_decimal::Decimal;

/// One observed mid-price point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSample {
    pub price: Decimal,
    pub timestamp_ms: i64,
    pub volume: Decimal,
}

impl PriceSample {
    pub fn new(price: Decimal, timestamp_ms: i64, volume: Decimal) -> Self {
        Self {
            price,
            timestamp_ms,
            volume,
        }
    }
}

/// Ring-buffer price history: size never exceeds capacity, pushing past
/// capacity evicts the oldest sample.
#[derive(Debug)]
pub(crate) struct PriceHistory {
    samples: VecDeque<PriceSample>,
    capacity: usize,
}

impl PriceHistory {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, sample: PriceSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    pub(crate) fn clear(&mut self) {
        self.samples.clear();
    }

    /// Oldest-to-newest copy of the current contents.
    pub(crate) fn snapshot(&self) -> Vec<PriceSample> {
        self.samples.iter().copied().collect()
    }
}
