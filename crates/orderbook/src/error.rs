//! Order book error types.

use thiserror::Error;

/// Errors that can occur while applying depth batches.
#[derive(Debug, Error)]
pub enum OrderBookError {
    /// The batch is not contiguous with the last applied update; the
    /// caller should discard the book and resynchronize.
    #[error("sequence gap: expected {expected}, got {actual}")]
    SequenceGap { expected: u64, actual: u64 },
}
