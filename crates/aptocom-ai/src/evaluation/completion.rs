//! Completion capability consumed by the evaluator.
//!
//! The evaluator only sees this contract; [`super::groq::GroqClient`] is the production
//! transport and tests plug in scripted fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling controls forwarded to the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub options: CompletionOptions,
}

impl CompletionRequest {
    pub fn new(
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            options,
        }
    }
}

/// Raw completion text plus usage metadata when the provider reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub usage_tokens: Option<u64>,
}

impl Completion {
    pub fn new(text: impl Into<String>, usage_tokens: Option<u64>) -> Self {
        Self {
            text: text.into(),
            usage_tokens,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Transport-level failure of a completion call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("completion API key is not configured")]
    MissingApiKey,
    #[error("completion provider rejected credentials: {0}")]
    Unauthorized(String),
    #[error("completion provider rate limit exceeded")]
    RateLimited,
    #[error("completion provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion transport error: {0}")]
    Transport(String),
    #[error("completion payload could not be decoded: {0}")]
    Decode(String),
}

/// External LLM completion call.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError>;
}

#[async_trait]
impl<T> CompletionClient for std::sync::Arc<T>
where
    T: CompletionClient + ?Sized,
{
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        (**self).complete(request).await
    }
}
