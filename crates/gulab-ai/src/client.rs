//! # Text-Generation Client
//!
//! Thin client for an OpenAI-compatible chat-completions endpoint.
//!
//! ## Request Shape
//! ```text
//! POST {endpoint}/chat/completions
//! Authorization: Bearer {api_key}
//! { "model": ..., "messages": [ {system}, {user} ] }
//! ```
//! The flows in [`crate::flows`] build the prompts; this module only moves
//! bytes and maps failures to [`AiError`].

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AiError, AiResult};

/// Default request timeout. Generation can be slow; checkout never waits on
/// it because notification dispatch runs after commit.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client for the hosted text-generation endpoint.
#[derive(Debug, Clone)]
pub struct TextGenClient {
    endpoint: String,
    api_key: String,
    model: String,
    http_client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl TextGenClient {
    /// Creates a client for the given endpoint.
    ///
    /// `endpoint` is the API base (e.g. `https://api.example.com/v1`);
    /// the chat-completions path is appended per request.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> AiResult<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        Ok(TextGenClient {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            http_client,
        })
    }

    /// Creates a client from environment variables, or `None` if the
    /// endpoint or key is unset (generation features are then disabled).
    ///
    /// - `GULAB__TEXTGEN__API_ENDPOINT`
    /// - `GULAB__TEXTGEN__API_KEY`
    /// - `GULAB__TEXTGEN__MODEL` (optional, defaults to `gemini-2.0-flash`)
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("GULAB__TEXTGEN__API_ENDPOINT").ok()?;
        let api_key = std::env::var("GULAB__TEXTGEN__API_KEY").ok()?;
        let model = std::env::var("GULAB__TEXTGEN__MODEL")
            .unwrap_or_else(|_| "gemini-2.0-flash".to_string());

        Self::new(endpoint, api_key, model).ok()
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Runs one chat completion and returns the raw text content.
    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> AiResult<String> {
        let url = format!("{}/chat/completions", self.endpoint);

        debug!(model = %self.model, "Sending generation request");

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: 0.7,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AiError::ApiStatus { status, body });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AiError::EmptyOutput);
        }

        Ok(content)
    }
}
