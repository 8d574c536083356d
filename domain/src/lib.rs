//! Domain layer for reel-quorum
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Core decision
//!
//! The [`DecisionFramework`] turns a [`ProductionRequest`] into a
//! [`CoreDecision`]: clip count, per-clip bound, word budget, voice and
//! platform tolerance. These numbers are computed locally and never negotiated.
//!
//! ## Discussion
//!
//! Production roles (creative director, scriptwriter, editor, ...) discuss the
//! creative choices phase by phase. Each round every role states a
//! [`Position`]; the [`ConsensusEvaluator`] scores the round by weighted
//! agreement and the phase ends once the threshold is met or rounds run out.
//!
//! ## Aggregation
//!
//! The [`DecisionAggregator`] merges the finished [`SessionRun`] into a
//! [`FinalConfiguration`], rewriting any phase text whose numbers contradict
//! the core decision.

pub mod aggregation;
pub mod config;
pub mod core;
pub mod discussion;
pub mod production;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use aggregation::{
    Aggregation, AggregationConflict, ClaimKind, DecisionAggregator, FinalConfiguration,
    PhaseDecision,
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::error::DomainError;
pub use discussion::{
    ConsensusEvaluator, ConsensusResult, DiscussionMode, Phase, PhaseId, PhaseOutcome,
    PhaseProgress, PhaseState, PhaseTermination, Position, PositionSource, Role, RoleId,
    RoleRegistry, RoleWeights, RoundRecord, TopicContext, Vote, VoteTally,
};
pub use production::{
    CoreDecision, DecisionFramework, DecisionParams, Language, Platform, ProductionRequest,
    Tolerance,
};
pub use prompt::PromptTemplate;
pub use session::{AuditRecord, RunId, RunStatus, SessionRun};
