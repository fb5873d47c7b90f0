//! OpenAI-compatible chat completions backend.
//!
//! Works with the OpenAI API and any server exposing the same
//! `/chat/completions` shape (vLLM, Ollama, LocalAI).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::traits::*;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Content reported when a completion carries no message text.
pub const EMPTY_CONTENT: &str = "{}";

/// OpenAI-compatible backend bound to one model.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiBackend {
    /// Create a backend with its own HTTP client.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, LlmError> {
        Ok(Self::with_client(build_client(DEFAULT_TIMEOUT)?, base_url, model, api_key))
    }

    /// Create a backend on a shared HTTP client.
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        }
    }

    /// Create a backend for the OpenAI API.
    pub fn openai(model: &str, api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::new("https://api.openai.com/v1", model, Some(api_key.into()))
    }

    /// Same endpoint and credentials, different model.
    pub fn for_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn auth_header(&self) -> Option<String> {
        self.api_key.as_ref().map(|k| format!("Bearer {}", k))
    }
}

/// HTTP client with JSON content type and the given timeout.
pub fn build_client(timeout: Duration) -> Result<Client, LlmError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );

    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Unavailable(format!("Failed to create HTTP client: {}", e)))
}

/// OpenAI chat completion request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatRequest>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormatRequest {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// OpenAI chat completion response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<UsageResponse>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<MessageResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Extract content from a success body.
///
/// A body that is not a completion envelope is passed through as the content
/// itself; a missing message becomes [`EMPTY_CONTENT`]. Either way the caller
/// gets text to judge instead of an error.
fn read_completion(body: String) -> CompletionResponse {
    let chat_response = match serde_json::from_str::<ChatResponse>(&body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "Unreadable completion envelope, passing body through");
            return CompletionResponse {
                content: body,
                finish_reason: FinishReason::Stop,
                usage: Usage::default(),
            };
        }
    };

    let (content, finish_reason) = match chat_response.choices.into_iter().next() {
        Some(choice) => (
            choice.message.and_then(|m| m.content),
            match choice.finish_reason.as_deref() {
                Some("length") => FinishReason::Length,
                Some("content_filter") => FinishReason::ContentFilter,
                _ => FinishReason::Stop,
            },
        ),
        None => (None, FinishReason::Stop),
    };

    let usage = chat_response
        .usage
        .map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    CompletionResponse {
        content: content.unwrap_or_else(|| EMPTY_CONTENT.to_string()),
        finish_reason,
        usage,
    }
}

impl ChatRequest {
    fn build(model: &str, request: CompletionRequest) -> Self {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system_prompt {
            messages.push(ChatMessage {
                role: MessageRole::System.as_str(),
                content: system,
            });
        }
        messages.extend(request.messages.into_iter().map(|m| ChatMessage {
            role: m.role.as_str(),
            content: m.content,
        }));

        Self {
            model: model.to_string(),
            messages,
            temperature: request.temperature,
            response_format: request.response_format.map(|rf| ResponseFormatRequest {
                format_type: match rf {
                    ResponseFormat::JsonObject => "json_object",
                    ResponseFormat::Text => "text",
                },
            }),
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let chat_request = ChatRequest::build(&self.model, request);
        debug!(model = %self.model, url = %self.chat_completions_url(), "Chat completion request");

        let mut http_request = self.client.post(self.chat_completions_url());
        if let Some(auth) = self.auth_header() {
            http_request = http_request.header(header::AUTHORIZATION, auth);
        }

        let response = http_request
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;
        Ok(read_completion(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_creation() {
        let backend = OpenAiBackend::openai("gpt-5-nano", "sk-test").unwrap();
        assert_eq!(backend.id(), "gpt-5-nano");
        assert_eq!(backend.chat_completions_url(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(backend.auth_header().as_deref(), Some("Bearer sk-test"));
    }

    #[test]
    fn test_for_model_keeps_endpoint() {
        let backend = OpenAiBackend::new("http://localhost:11434/v1/", "qwen", None).unwrap();
        let other = backend.for_model("llama");
        assert_eq!(other.id(), "llama");
        assert_eq!(other.chat_completions_url(), "http://localhost:11434/v1/chat/completions");
        assert!(other.auth_header().is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let request = CompletionRequest::user("judge: rice")
            .with_system("you are a dietitian")
            .with_temperature(0.2)
            .with_json_output();
        let body = serde_json::to_value(ChatRequest::build("gpt-5-nano", request)).unwrap();

        assert_eq!(body["model"], "gpt-5-nano");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "judge: rice");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_read_completion_tolerates_bad_envelopes() {
        let raw = read_completion("<html>oops</html>".to_string());
        assert_eq!(raw.content, "<html>oops</html>");

        let no_message = read_completion(r#"{"choices":[{"finish_reason":"stop"}]}"#.to_string());
        assert_eq!(no_message.content, EMPTY_CONTENT);

        let null_content = read_completion(r#"{"choices":[{"message":{"content":null}}]}"#.to_string());
        assert_eq!(null_content.content, EMPTY_CONTENT);

        let no_choices = read_completion(r#"{"choices":[]}"#.to_string());
        assert_eq!(no_choices.content, EMPTY_CONTENT);

        let ok = read_completion(
            r#"{"choices":[{"message":{"content":"{\"level\":\"safe\"}"},"finish_reason":"length"}],"usage":{"prompt_tokens":3,"completion_tokens":4}}"#
                .to_string(),
        );
        assert_eq!(ok.content, r#"{"level":"safe"}"#);
        assert_eq!(ok.finish_reason, FinishReason::Length);
        assert_eq!(ok.usage.completion_tokens, 4);
    }
}
