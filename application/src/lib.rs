//! Application layer for reel-quorum
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod retry;
pub mod use_cases;

// Re-export commonly used types
pub use config::DiscussionParams;
pub use ports::{
    audit_sink::{AuditError, AuditSink, NoAuditSink},
    llm_gateway::{GatewayError, LlmGateway},
    progress::{DiscussionProgress, NoProgress},
};
pub use retry::RetryPolicy;
pub use use_cases::generate_position::{PositionGenerationError, PositionGenerator};
pub use use_cases::resolve_production::{
    ResolveProductionError, ResolveProductionInput, ResolveProductionUseCase,
};
pub use use_cases::run_discussion::RunDiscussionUseCase;
