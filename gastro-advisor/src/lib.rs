//! Gastro Advisor - food suitability advice from a chat-completion model
//!
//! Asks a language model whether a food suits a gastritis diet and turns the
//! answer into a typed [`FoodAdvice`]:
//! - Trait-based LLM backends (OpenAI-compatible HTTP, scripted mock)
//! - Automatic retry on a fallback model when the preferred one is unavailable
//! - Conservative degradation: a malformed answer becomes `caution`, never a crash
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              FoodAdvisor                │
//! │   prompt ─► AdvisoryState ─► parse      │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │ preferred   │       │ fallback    │
//! │ LlmBackend  │       │ LlmBackend  │
//! └─────────────┘       └─────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gastro_advisor::{AdvisorConfig, FoodAdvisor};
//!
//! # async fn example() -> Result<(), gastro_advisor::AdvisorError> {
//! let advisor = FoodAdvisor::from_config(&AdvisorConfig {
//!     api_key: Some("sk-...".to_string()),
//!     ..Default::default()
//! })?;
//! let advisory = advisor.advise("millet porridge").await?;
//! println!("{}: {}", advisory.advice.level, advisory.advice.reason);
//! # Ok(())
//! # }
//! ```

pub mod advice;
pub mod advisor;
pub mod backend;
pub mod error;
pub mod prompt;

pub use advice::{parse_advice, FoodAdvice, ParsedAdvice};
pub use advisor::{
    AdvisorConfig, Advisory, AdvisoryState, Attempt, FoodAdvisor, DEFAULT_BASE_URL, DEFAULT_MODEL,
    FALLBACK_MODEL,
};
pub use backend::{CompletionRequest, CompletionResponse, LlmBackend, LlmError, MockBackend, OpenAiBackend};
pub use error::{AdvisorError, Result};
