//! Role discussion domain
//!
//! A discussion is a fixed sequence of phases. In every round of a phase each
//! participating role states a [`Position`] (a vote plus rationale); the
//! [`ConsensusEvaluator`] scores the round and the [`PhaseProgress`] state
//! machine decides whether to run another round.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Phase (script)                                               │
//! │                                                              │
//! │  PENDING ─► ROUND_RUNNING ─┬─► CONSENSUS_REACHED             │
//! │                 ▲          │   (agreement >= threshold)      │
//! │                 └──────────┤                                 │
//! │        (round < max_rounds)└─► ROUNDS_EXHAUSTED              │
//! │                                (best round kept, degraded)   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod consensus;
pub mod mode;
pub mod parsing;
pub mod phase;
pub mod role;
pub mod state;
pub mod vote;

pub use consensus::{ConsensusEvaluator, ConsensusResult, VoteTally, summarize_disagreement};
pub use mode::DiscussionMode;
pub use parsing::{parse_position_reply, parse_vote};
pub use phase::{Phase, PhaseId, TopicContext};
pub use role::{Role, RoleId, RoleRegistry, RoleWeights};
pub use state::{PhaseOutcome, PhaseProgress, PhaseState, PhaseTermination, RoundRecord};
pub use vote::{Position, PositionSource, Vote};
