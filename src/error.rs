//! Error types for the normalization write path

use thiserror::Error;

/// Errors surfaced at the edges of the normalization core. The grouping
/// algorithm itself never fails; "cannot generalize" is a normal outcome,
/// not an error.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// A rule's group pattern failed to compile
    #[error("Invalid group pattern '{pattern}'")]
    InvalidGroupPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Config export failed to serialize
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
