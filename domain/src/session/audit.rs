//! Audit trail records
//!
//! Every record is serialized with a `type` tag; the sink adds the run id and
//! a timestamp before writing it out.

use crate::aggregation::AggregationConflict;
use crate::discussion::{
    ConsensusResult, DiscussionMode, PhaseId, PhaseTermination, Position,
};
use crate::production::CoreDecision;
use crate::session::RunStatus;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditRecord {
    RunStarted {
        brief: String,
        mode: DiscussionMode,
        decision: CoreDecision,
    },
    Position {
        phase: PhaseId,
        position: Position,
    },
    Consensus {
        phase: PhaseId,
        result: ConsensusResult,
    },
    PhaseFinished {
        phase: PhaseId,
        termination: PhaseTermination,
        rounds: usize,
        agreement_fraction: f64,
    },
    ConflictResolved {
        conflict: AggregationConflict,
    },
    RunFinished {
        status: RunStatus,
    },
}

impl AuditRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            AuditRecord::RunStarted { .. } => "run_started",
            AuditRecord::Position { .. } => "position",
            AuditRecord::Consensus { .. } => "consensus",
            AuditRecord::PhaseFinished { .. } => "phase_finished",
            AuditRecord::ConflictResolved { .. } => "conflict_resolved",
            AuditRecord::RunFinished { .. } => "run_finished",
        }
    }
}
