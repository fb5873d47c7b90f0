//! LLM backend abstraction layer.
//!
//! - OpenAI-compatible chat completions (OpenAI, vLLM, Ollama, ...)
//! - Scripted mock backend for tests

pub mod mock;
pub mod openai;
pub mod traits;

pub use mock::MockBackend;
pub use openai::OpenAiBackend;
pub use traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmBackend, LlmError, Message, MessageRole,
    ResponseFormat, Usage,
};
