//! Provider-agnostic chat-completion client. The extractor and confidence
//! reviewer both need "messages in, JSON-shaped string out"; this crate
//! models that contract as a trait so a mock provider can stand in for
//! tests without a live network call.

pub mod error;
pub mod mock;
pub mod openai;

pub use error::LlmError;
pub use mock::MockProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".into(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }
}

/// One chat-completion call. `temperature` is expected to be kept small
/// (<=0.3) by callers that need deterministic, schema-shaped output.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>, temperature: f32) -> Self {
        Self { model: model.into(), messages, temperature }
    }
}

/// A chat-completions-like provider. Implementations return the raw
/// response text; callers are responsible for parsing it against their own
/// schema (the provider makes no assumptions about the JSON shape).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError>;
}
