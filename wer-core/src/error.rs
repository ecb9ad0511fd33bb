//! Error types for WER scoring

use thiserror::Error;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised while normalizing, aligning, scoring or aggregating
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error("Reference contains no words; WER is undefined")]
    Division,

    #[error("Cannot aggregate an empty batch")]
    EmptyBatch,

    #[error("Deadline exceeded after {completed} of {total} comparisons; partial results discarded")]
    DeadlineExceeded { completed: usize, total: usize },

    #[error("Comparison worker failed: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
