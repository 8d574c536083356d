//! Generate Position use case
//!
//! Asks one role for its stance on the current topic and parses the reply.

use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::retry::RetryPolicy;
use reel_domain::discussion::parse_position_reply;
use reel_domain::{Position, PromptTemplate, Role};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PositionGenerationError {
    #[error("Text generation failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Empty reply")]
    EmptyReply,
}

/// Produces one [`Position`] per `(role, prompt, round)`.
pub struct PositionGenerator<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    retry: RetryPolicy,
}

impl<G: LlmGateway + 'static> Clone for PositionGenerator<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            retry: self.retry,
        }
    }
}

impl<G: LlmGateway + 'static> PositionGenerator<G> {
    pub fn new(gateway: Arc<G>, retry: RetryPolicy) -> Self {
        Self { gateway, retry }
    }

    /// Call the gateway (with retries) and parse the reply.
    pub async fn generate(
        &self,
        role: &Role,
        prompt: &str,
        round_index: u32,
    ) -> Result<Position, PositionGenerationError> {
        let system_prompt = PromptTemplate::position_system(role);
        let operation = format!("position:{}", role.id);

        let reply = self
            .retry
            .run(&operation, || self.gateway.generate(&system_prompt, prompt))
            .await?;

        if reply.trim().is_empty() {
            return Err(PositionGenerationError::EmptyReply);
        }

        let (vote, rationale) = parse_position_reply(&reply);
        debug!(role = %role.id, round = round_index, vote = %vote, "Parsed position");
        Ok(Position::generated(role.id.clone(), vote, rationale, round_index))
    }

    /// Like [`generate`](Self::generate), but any failure becomes a neutral fallback.
    pub async fn generate_or_neutral(&self, role: &Role, prompt: &str, round_index: u32) -> Position {
        match self.generate(role, prompt, round_index).await {
            Ok(position) => position,
            Err(e) => Position::fallback(role.id.clone(), round_index, e.to_string()),
        }
    }
}
