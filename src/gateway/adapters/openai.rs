//! Adapter for OpenAI-compatible `chat/completions` endpoints.
//!
//! Kimi (Moonshot) and `DeepSeek` both speak this protocol, so one adapter
//! with per-provider configuration covers every default provider.

use crate::gateway::{
    domain::CompletionRequest,
    ports::{ModelProvider, ProviderCallError},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// Connection settings for one OpenAI-compatible provider.
#[derive(Clone, PartialEq)]
pub struct OpenAiProviderConfig {
    /// Provider name used in logs.
    pub name: String,
    /// Base URL up to and including the API version, e.g.
    /// `https://api.moonshot.cn/v1`.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Bearer token.
    pub api_key: String,
    /// Network-level timeout for one call.
    pub timeout: Duration,
    /// User-message budget in characters.
    pub max_input_chars: usize,
    /// Sampling temperature.
    pub temperature: f32,
}

impl fmt::Debug for OpenAiProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiProviderConfig")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_input_chars", &self.max_input_chars)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// `reqwest`-backed provider for OpenAI-compatible APIs.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    config: OpenAiProviderConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// Builds a provider with its own HTTP client and timeout.
    ///
    /// # Errors
    ///
    /// Returns the client builder error when the TLS backend cannot be
    /// initialised.
    pub fn new(config: OpenAiProviderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ModelProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn max_input_chars(&self) -> usize {
        self.config.max_input_chars
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderCallError> {
        let body = ChatCompletionBody {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderCallError::Transport {
                provider: self.config.name.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderCallError::Status {
                provider: self.config.name.clone(),
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
            });
        }

        let payload: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|source| ProviderCallError::Decode {
                    provider: self.config.name.clone(),
                    source,
                })?;

        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ProviderCallError::EmptyContent {
                provider: self.config.name.clone(),
            })
    }
}
