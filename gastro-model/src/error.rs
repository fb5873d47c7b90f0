//! Error types for model validation

use thiserror::Error;

/// Validation error for model values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Pain level outside 0..=10
    #[error("pain_level must be between 0 and {max}, got {actual}")]
    PainOutOfRange { max: u8, actual: i64 },

    /// Appetite level outside 0..=5
    #[error("appetite_level must be between 0 and {max}, got {actual}")]
    AppetiteOutOfRange { max: u8, actual: i64 },

    /// Text did not name a known variant
    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    /// Required field was empty
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
