//! The advisory client and its request state machine.
//!
//! Each question walks one path through:
//!
//! ```text
//! Idle ─► Requesting(Preferred) ─┬─► Succeeded
//!                                ├─► Requesting(Fallback) ─┬─► Succeeded
//!                                │                         └─► Failed
//!                                └─► Failed
//! ```
//!
//! Only a model-availability failure of the preferred model leads to the
//! fallback; every other failure is terminal.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::advice::{parse_advice, FoodAdvice};
use crate::backend::openai::build_client;
use crate::backend::{CompletionResponse, LlmBackend, LlmError, OpenAiBackend};
use crate::error::{AdvisorError, Result};
use crate::prompt::advice_request;

/// Model asked first unless configured otherwise.
pub const DEFAULT_MODEL: &str = "gpt-5-nano";

/// Model asked when the preferred one is unavailable.
pub const FALLBACK_MODEL: &str = "gpt-4o-mini";

/// Default completion endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for [`FoodAdvisor::from_config`].
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// API key; required
    pub api_key: Option<String>,
    /// Preferred model override
    pub model: Option<String>,
    /// Completion API base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl AdvisorConfig {
    /// The preferred model, ignoring a blank override.
    pub fn preferred_model(&self) -> &str {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }
}

/// Which model a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Preferred,
    Fallback,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attempt::Preferred => f.write_str("preferred"),
            Attempt::Fallback => f.write_str("fallback"),
        }
    }
}

/// State of one advisory request.
#[derive(Debug)]
pub enum AdvisoryState {
    Idle,
    Requesting(Attempt),
    /// A completion arrived; its content may still be malformed
    Succeeded { attempt: Attempt, response: CompletionResponse },
    Failed(AdvisorError),
}

impl AdvisoryState {
    /// Leave `Idle`. Any other state is returned unchanged.
    pub fn start(self) -> Self {
        match self {
            AdvisoryState::Idle => AdvisoryState::Requesting(Attempt::Preferred),
            other => other,
        }
    }

    /// Apply the outcome of the request made in `Requesting`. Other states
    /// are returned unchanged.
    pub fn advance(self, outcome: std::result::Result<CompletionResponse, LlmError>) -> Self {
        let AdvisoryState::Requesting(attempt) = self else {
            return self;
        };
        match (attempt, outcome) {
            (attempt, Ok(response)) => AdvisoryState::Succeeded { attempt, response },
            (Attempt::Preferred, Err(e)) if e.is_model_unavailable() => {
                AdvisoryState::Requesting(Attempt::Fallback)
            }
            (_, Err(e)) => AdvisoryState::Failed(e.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AdvisoryState::Succeeded { .. } | AdvisoryState::Failed(_))
    }
}

/// Advice together with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Advisory {
    pub food: String,
    pub advice: FoodAdvice,
    /// Model that produced the answer
    pub model: String,
    pub used_fallback: bool,
    /// The answer was unusable and replaced by conservative advice
    pub degraded: bool,
}

/// Asks a language model whether a food suits a gastritis diet.
pub struct FoodAdvisor {
    preferred: Arc<dyn LlmBackend>,
    fallback: Arc<dyn LlmBackend>,
}

impl fmt::Debug for FoodAdvisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoodAdvisor")
            .field("preferred", &self.preferred.id())
            .field("fallback", &self.fallback.id())
            .finish()
    }
}

impl FoodAdvisor {
    /// Create an advisor over explicit backends.
    pub fn new(preferred: Arc<dyn LlmBackend>, fallback: Arc<dyn LlmBackend>) -> Self {
        Self { preferred, fallback }
    }

    /// Create OpenAI-compatible backends for the preferred and fallback models.
    ///
    /// Fails with [`AdvisorError::Configuration`] when no API key is set.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AdvisorError::Configuration("OpenAI API key is missing: set OPENAI_API_KEY".to_string())
            })?;

        let client = build_client(Duration::from_secs(config.timeout_secs))?;
        let preferred = OpenAiBackend::with_client(
            client,
            config.base_url.clone(),
            config.preferred_model(),
            Some(api_key.to_string()),
        );
        let fallback = preferred.for_model(FALLBACK_MODEL);

        Ok(Self::new(Arc::new(preferred), Arc::new(fallback)))
    }

    pub fn preferred_model(&self) -> &str {
        self.preferred.id()
    }

    /// Judge one food.
    ///
    /// Returns an error only for a blank food name or a failure that the
    /// fallback cannot cover; malformed answers come back as degraded advice.
    pub async fn advise(&self, food_name: &str) -> Result<Advisory> {
        let food = food_name.trim();
        if food.is_empty() {
            return Err(AdvisorError::InvalidRequest("food name is empty".to_string()));
        }
        let request = advice_request(food);

        let mut state = AdvisoryState::Idle;
        loop {
            state = match state {
                AdvisoryState::Idle => AdvisoryState::Idle.start(),
                AdvisoryState::Requesting(attempt) => {
                    let backend = self.backend(attempt);
                    info!(food = %food, model = %backend.id(), %attempt, "Requesting food advice");
                    let outcome = backend.complete(request.clone()).await;
                    if let Err(e) = &outcome {
                        warn!(model = %backend.id(), %attempt, error = %e, "Food advice request failed");
                    }
                    AdvisoryState::Requesting(attempt).advance(outcome)
                }
                AdvisoryState::Succeeded { attempt, response } => {
                    let parsed = parse_advice(&response.content);
                    if parsed.degraded {
                        warn!(food = %food, "Unusable advice from model, falling back to caution");
                    }
                    return Ok(Advisory {
                        food: food.to_string(),
                        advice: parsed.advice,
                        model: self.backend(attempt).id().to_string(),
                        used_fallback: attempt == Attempt::Fallback,
                        degraded: parsed.degraded,
                    });
                }
                AdvisoryState::Failed(e) => return Err(e),
            };
        }
    }

    fn backend(&self, attempt: Attempt) -> &dyn LlmBackend {
        match attempt {
            Attempt::Preferred => self.preferred.as_ref(),
            Attempt::Fallback => self.fallback.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FinishReason, MockBackend, Usage};
    use gastro_model::SafetyLevel;

    fn response(content: &str) -> CompletionResponse {
        CompletionResponse {
            content: content.to_string(),
            finish_reason: FinishReason::Stop,
            usage: Usage::default(),
        }
    }

    fn http(status: u16, body: &str) -> LlmError {
        LlmError::Http { status, body: body.to_string() }
    }

    #[test]
    fn test_transitions() {
        let state = AdvisoryState::Idle.start();
        assert!(matches!(state, AdvisoryState::Requesting(Attempt::Preferred)));

        let state = state.advance(Err(http(404, "")));
        assert!(matches!(state, AdvisoryState::Requesting(Attempt::Fallback)));

        let state = state.advance(Ok(response("{}")));
        assert!(matches!(state, AdvisoryState::Succeeded { attempt: Attempt::Fallback, .. }));
        assert!(state.is_terminal());
    }

    #[test]
    fn test_fallback_failure_is_terminal() {
        let state = AdvisoryState::Requesting(Attempt::Fallback).advance(Err(http(404, "model gone")));
        match state {
            AdvisoryState::Failed(AdvisorError::RequestFailed { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "model gone");
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_other_failure_skips_fallback() {
        let state = AdvisoryState::Idle.start().advance(Err(http(401, "invalid api key")));
        assert!(matches!(state, AdvisoryState::Failed(AdvisorError::RequestFailed { status: 401, .. })));

        let state = AdvisoryState::Idle.start().advance(Err(LlmError::Network("refused".into())));
        assert!(matches!(state, AdvisoryState::Failed(AdvisorError::Network(_))));
    }

    #[test]
    fn test_terminal_states_ignore_outcomes() {
        let failed = AdvisoryState::Failed(AdvisorError::Network("x".into())).advance(Ok(response("{}")));
        assert!(matches!(failed, AdvisoryState::Failed(_)));
        assert!(matches!(AdvisoryState::Idle.advance(Ok(response("{}"))), AdvisoryState::Idle));
    }

    #[tokio::test]
    async fn test_preferred_answers() {
        let preferred = Arc::new(MockBackend::new("gpt-5-nano").then_reply(
            r#"{"level":"safe","reason":"Soft and warm.","alternatives":[],"preparationTips":"Simmer well."}"#,
        ));
        let fallback = Arc::new(MockBackend::new("gpt-4o-mini"));
        let advisor = FoodAdvisor::new(preferred.clone(), fallback.clone());

        let advisory = advisor.advise("millet porridge").await.unwrap();
        assert_eq!(advisory.advice.level, SafetyLevel::Safe);
        assert_eq!(advisory.model, "gpt-5-nano");
        assert!(!advisory.used_fallback);
        assert!(!advisory.degraded);
        assert_eq!(preferred.call_count(), 1);
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_model_retries_on_fallback() {
        let preferred = Arc::new(
            MockBackend::new("gpt-5-nano").then_fail(http(400, "The model `gpt-5-nano` does not exist")),
        );
        let fallback = Arc::new(MockBackend::new("gpt-4o-mini").then_reply(r#"{"level":"avoid","reason":"Spicy."}"#));
        let advisor = FoodAdvisor::new(preferred.clone(), fallback.clone());

        let advisory = advisor.advise("chili").await.unwrap();
        assert_eq!(advisory.advice.level, SafetyLevel::Avoid);
        assert_eq!(advisory.model, "gpt-4o-mini");
        assert!(advisory.used_fallback);
        assert_eq!(fallback.requests(), preferred.requests());
    }

    #[tokio::test]
    async fn test_malformed_answer_degrades() {
        let preferred = Arc::new(MockBackend::new("p").then_reply("I think it is fine"));
        let advisor = FoodAdvisor::new(preferred, Arc::new(MockBackend::new("f")));

        let advisory = advisor.advise("banana").await.unwrap();
        assert!(advisory.degraded);
        assert_eq!(advisory.advice.level, SafetyLevel::Caution);
        assert_eq!(advisory.advice.reason, "I think it is fine");
    }

    #[tokio::test]
    async fn test_blank_food_rejected() {
        let preferred = Arc::new(MockBackend::new("p"));
        let advisor = FoodAdvisor::new(preferred.clone(), Arc::new(MockBackend::new("f")));
        assert!(matches!(advisor.advise("   ").await, Err(AdvisorError::InvalidRequest(_))));
        assert_eq!(preferred.call_count(), 0);
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = FoodAdvisor::from_config(&AdvisorConfig::default()).unwrap_err();
        assert!(matches!(err, AdvisorError::Configuration(_)));

        let blank = AdvisorConfig {
            api_key: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(FoodAdvisor::from_config(&blank), Err(AdvisorError::Configuration(_))));
    }

    #[test]
    fn test_model_override() {
        let config = AdvisorConfig {
            api_key: Some("sk".into()),
            model: Some("gpt-4.1-mini".into()),
            ..Default::default()
        };
        assert_eq!(FoodAdvisor::from_config(&config).unwrap().preferred_model(), "gpt-4.1-mini");
        assert_eq!(AdvisorConfig::default().preferred_model(), DEFAULT_MODEL);
    }
}
