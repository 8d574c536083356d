//! LLM Gateway port
//!
//! Defines the interface for calling an external text-generation service.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during text generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The service could not be reached or answered with a server-side error.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The service is rate limiting requests.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Timeout")]
    Timeout,

    /// The request was rejected (bad credentials, unknown model, ...).
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The service answered, but not with anything usable.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Whether a retry has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::ServiceUnavailable(_) | GatewayError::RateLimited(_) | GatewayError::Timeout
        )
    }
}

/// Gateway for text generation
///
/// This port defines how the application layer talks to a text-generation
/// provider. Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Generate a reply for `prompt` under `system_prompt`.
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GatewayError>;

    /// Model identifier used for log lines.
    fn model_name(&self) -> &str {
        "unknown"
    }
}
