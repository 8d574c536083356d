//! OpenAI-compatible chat-completions gateway.
//!
//! Works against any endpoint that speaks `POST {base_url}/chat/completions`
//! (OpenAI, Azure-style proxies, local servers such as Ollama or vLLM).
//! HTTP failures are classified so the retry policy can tell transient
//! outages from permanent errors.

use crate::config::FileProviderConfig;
use async_trait::async_trait;
use reel_application::ports::llm_gateway::{GatewayError, LlmGateway};
use reel_domain::core::string::truncate;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Longest slice of an error body kept in error messages
const ERROR_BODY_LIMIT: usize = 300;

/// Resolved provider settings
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl OpenAiConfig {
    pub fn from_file(file: &FileProviderConfig) -> Self {
        Self {
            base_url: file.base_url.trim_end_matches('/').to_string(),
            model: file.model.clone(),
            api_key: file.resolve_api_key(),
            max_tokens: file.max_tokens,
            temperature: file.temperature,
            request_timeout: Duration::from_secs(file.request_timeout_seconds),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

/// [`LlmGateway`] over an OpenAI-compatible HTTP API
pub struct OpenAiGateway {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiGateway {
    pub fn new(config: OpenAiConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::RequestFailed(format!("HTTP client setup failed: {e}")))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

fn classify_send_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() {
        GatewayError::ServiceUnavailable(error.to_string())
    } else {
        GatewayError::RequestFailed(error.to_string())
    }
}

fn classify_status(status: StatusCode, body: &str) -> GatewayError {
    let detail = format!("HTTP {status}: {}", truncate(body.trim(), ERROR_BODY_LIMIT));
    match status {
        StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited(detail),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
        s if s.is_server_error() => GatewayError::ServiceUnavailable(detail),
        _ => GatewayError::RequestFailed(detail),
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GatewayError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(classify_send_error)?;
        let status = response.status();
        let text = response.text().await.map_err(classify_send_error)?;
        debug!(model = %self.config.model, %status, bytes = text.len(), "Chat completion returned");

        if !status.is_success() {
            return Err(classify_status(status, &text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            GatewayError::InvalidResponse(format!(
                "{e}: {}",
                truncate(&text, ERROR_BODY_LIMIT)
            ))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| GatewayError::InvalidResponse("response has no choices".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
