//! Error types for the advisory client.

use thiserror::Error;

use crate::backend::LlmError;

/// Result type for advisory operations.
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Errors surfaced to callers of [`crate::FoodAdvisor`].
///
/// A malformed model answer is not an error; it degrades to `caution` advice.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Missing or unusable credentials; raised before any request is made
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller passed something that cannot be asked about
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The completion API answered with a non-success status
    #[error("Advisory request failed: HTTP {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// The completion API could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// The completion API answered with something other than a chat response
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<LlmError> for AdvisorError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http { status, body } => AdvisorError::RequestFailed { status, body },
            LlmError::Network(msg) | LlmError::Unavailable(msg) => AdvisorError::Network(msg),
            LlmError::Parse(msg) => AdvisorError::Parse(msg),
        }
    }
}
