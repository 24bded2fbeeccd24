// Error taxonomy for the basket mining engine
// Per-row problems are recoverable; dataset/config problems are fatal

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A single input row could not be normalized (e.g. non-numeric
    /// quantity). The row is skipped and the batch continues; the
    /// normalizer collects these and reports them once at the end.
    #[error("malformed row {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// No baskets remain after normalization and filtering.
    /// The miner cannot run on an empty matrix.
    #[error("no baskets remain after normalization")]
    EmptyDataset,

    /// Nothing met the minimum support threshold, including single
    /// items. Surfaced to callers as an empty result with a reason,
    /// not as a crash.
    #[error("no frequent itemsets found: {reason}")]
    NoFrequentItemsets { reason: String },

    /// Configuration rejected at pipeline entry.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl EngineError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration {
            message: message.into(),
        }
    }
}
