use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::completion::{Completion, CompletionClient, CompletionError, CompletionRequest};
use crate::config::AiConfig;

/// Groq chat-completions client speaking the OpenAI-compatible wire format.
#[derive(Clone)]
pub struct GroqClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GroqClient {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: Option<u64>,
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        let api_key = self.api_key.as_deref().ok_or(CompletionError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.base_url);

        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_prompt },
            ],
            "temperature": request.options.temperature,
            "max_tokens": request.options.max_tokens,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => CompletionError::Unauthorized(body),
                429 => CompletionError::RateLimited,
                code => CompletionError::Status { status: code, body },
            });
        }

        let data: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Decode(e.to_string()))?;

        let text = data
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default();

        Ok(Completion {
            text,
            usage_tokens: data.usage.and_then(|usage| usage.total_tokens),
        })
    }
}
