//! Error types for manifest parsing and field interpretation.

use thiserror::Error;

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors raised while loading a manifest or interpreting one of its fields.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse manifest: {0}")]
    Parse(String),

    #[error("failed to parse deploy config: {0}")]
    Config(String),

    #[error("invalid range value {0}. Should be in format of ${{min}}-${{max}}")]
    InvalidRangeFormat(String),

    #[error("min value {min} cannot be greater than max value {max}")]
    InvalidRangeBounds { min: u32, max: u32 },

    #[error("\"range\" must specify both \"min\" and \"max\"")]
    IncompleteRange,

    #[error("\"range\" must be specified when scaling on metrics")]
    MissingRange,

    #[error("cannot convert {input:?} to a string slice: {reason}")]
    StringSlice { input: String, reason: String },
}
