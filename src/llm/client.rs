//! Client for OpenAI-compatible chat completion APIs (Groq by default)

use crate::config::LlmConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Single-shot text generation client.
///
/// Every call is one attempt; failures are returned to the caller as-is.
#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LlmClient {
    /// Creates a new `LlmClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://api.groq.com/openai/v1`.
    /// * `api_key` - Bearer token for the API.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Creates a client from configuration, reading the key from the
    /// configured environment variable.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).with_context(|| {
            format!(
                "Environment variable {} must hold the LLM API key",
                config.api_key_env
            )
        })?;

        info!(base_url = %config.base_url, "LLM client configured");
        Ok(Self::new(config.base_url.clone(), api_key))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends `prompt` as a single user message and returns the generated text.
    pub async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model, url = %url, prompt_chars = prompt.len(), "Requesting completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("LLM request to {} failed", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            bail!("LLM API returned {}: {}", status, error_text);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse LLM response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("LLM response contained no message content")?;

        info!(model, response_chars = content.len(), "Completion received");
        Ok(content)
    }
}
