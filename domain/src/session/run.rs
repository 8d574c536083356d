//! Session run entity

use crate::discussion::{DiscussionMode, PhaseId, PhaseOutcome};
use crate::production::CoreDecision;
use serde::{Deserialize, Serialize};

/// Identifier shared by every audit record of a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    InProgress,
    Completed,
    /// Finished, but some phase missed consensus or a role fell back
    Degraded,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Degraded => "degraded",
            RunStatus::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, RunStatus::InProgress)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One resolution run, exclusively owned by the orchestrator until it is
/// handed to the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRun {
    run_id: RunId,
    brief: String,
    mode: DiscussionMode,
    decision: CoreDecision,
    outcomes: Vec<PhaseOutcome>,
    status: RunStatus,
    degraded: bool,
}

impl SessionRun {
    pub fn new(
        run_id: RunId,
        brief: impl Into<String>,
        mode: DiscussionMode,
        decision: CoreDecision,
    ) -> Self {
        Self {
            run_id,
            brief: brief.into(),
            mode,
            decision,
            outcomes: Vec::new(),
            status: RunStatus::InProgress,
            degraded: false,
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn brief(&self) -> &str {
        &self.brief
    }

    pub fn mode(&self) -> DiscussionMode {
        self.mode
    }

    pub fn decision(&self) -> &CoreDecision {
        &self.decision
    }

    pub fn outcomes(&self) -> &[PhaseOutcome] {
        &self.outcomes
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Append a finished phase. Ignored once the run has finished.
    pub fn record_phase(&mut self, outcome: PhaseOutcome) {
        if self.status.is_finished() {
            return;
        }
        let fell_back = outcome.positions().any(|p| p.is_fallback());
        if outcome.is_degraded() || fell_back {
            self.degraded = true;
        }
        self.outcomes.push(outcome);
    }

    /// Mark the run degraded without a phase outcome (e.g. an interruption).
    pub fn mark_degraded(&mut self) {
        self.degraded = true;
    }

    /// Close the run as completed or degraded.
    pub fn finish(&mut self) -> RunStatus {
        if !self.status.is_finished() {
            self.status = if self.degraded {
                RunStatus::Degraded
            } else {
                RunStatus::Completed
            };
        }
        self.status
    }

    pub fn fail(&mut self) {
        self.status = RunStatus::Failed;
    }

    /// Final decision text of every recorded phase, in order.
    pub fn previous_decisions(&self) -> Vec<(PhaseId, String)> {
        self.outcomes
            .iter()
            .map(|o| (o.phase, o.final_result.decision_text.clone()))
            .collect()
    }

    /// True when positions were requested and every one of them fell back.
    pub fn is_total_outage(&self) -> bool {
        let mut any = false;
        for position in self.outcomes.iter().flat_map(|o| o.positions()) {
            if !position.is_fallback() {
                return false;
            }
            any = true;
        }
        any
    }
}
