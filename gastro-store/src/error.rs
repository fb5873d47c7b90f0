//! Error types for the store

use thiserror::Error;

/// PostgREST code for "the result contains 0 rows" on a single-object request.
pub const NO_ROWS_CODE: &str = "PGRST116";

/// Store error
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend rejected the request
    #[error("Backend error {status} ({code}): {message}")]
    Backend {
        status: u16,
        code: String,
        message: String,
    },

    /// A mutation targeted a row that does not exist
    #[error("Row not found in {table}")]
    NotFound { table: &'static str },

    /// Invalid response from backend
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing or unusable configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Real-time channel failure
    #[error("Realtime error: {0}")]
    Realtime(String),

    /// Local storage failure
    #[error("Local storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Record failed validation before being written
    #[error("Validation error: {0}")]
    Validation(#[from] gastro_model::ModelError),
}

impl StoreError {
    /// Whether this is the backend's "no rows" answer.
    pub fn is_no_rows(&self) -> bool {
        matches!(self, StoreError::Backend { code, .. } if code == NO_ROWS_CODE)
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
