//! Final configuration and the decision aggregator

use super::claims::{AggregationConflict, enforce_core_numbers};
use crate::discussion::{DiscussionMode, PhaseId, PhaseTermination, RoleId};
use crate::production::CoreDecision;
use crate::session::{RunId, RunStatus, SessionRun};
use serde::Serialize;

/// Agreed decision of one phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseDecision {
    pub phase: PhaseId,
    /// Empty when no role produced usable text
    pub decision: String,
    pub decided_by: Option<RoleId>,
    pub agreement_fraction: f64,
    pub low_confidence: bool,
    pub termination: PhaseTermination,
    pub rounds: usize,
}

/// The merged output of a run: core numbers plus per-phase decisions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalConfiguration {
    run_id: RunId,
    brief: String,
    mode: DiscussionMode,
    core: CoreDecision,
    phase_decisions: Vec<PhaseDecision>,
    status: RunStatus,
}

impl FinalConfiguration {
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn brief(&self) -> &str {
        &self.brief
    }

    pub fn mode(&self) -> DiscussionMode {
        self.mode
    }

    pub fn core(&self) -> &CoreDecision {
        &self.core
    }

    pub fn phase_decisions(&self) -> &[PhaseDecision] {
        &self.phase_decisions
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_degraded(&self) -> bool {
        self.status != RunStatus::Completed
    }

    pub fn decision_for(&self, phase: PhaseId) -> Option<&PhaseDecision> {
        self.phase_decisions.iter().find(|d| d.phase == phase)
    }
}

/// Aggregator output: the configuration plus every rewritten claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub configuration: FinalConfiguration,
    pub conflicts: Vec<AggregationConflict>,
}

/// Merges a finished [`SessionRun`] into a [`FinalConfiguration`].
///
/// Consuming the run means a configuration is produced once per run. The
/// core decision always wins over numbers stated in phase text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionAggregator;

impl DecisionAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, mut run: SessionRun) -> Aggregation {
        let status = run.finish();
        let core = run.decision().clone();
        let mut conflicts = Vec::new();

        let phase_decisions = run
            .outcomes()
            .iter()
            .map(|outcome| {
                let result = &outcome.final_result;
                let (decision, mut found) =
                    enforce_core_numbers(outcome.phase, &result.decision_text, &core);
                conflicts.append(&mut found);
                PhaseDecision {
                    phase: outcome.phase,
                    decision,
                    decided_by: result.decided_by.clone(),
                    agreement_fraction: result.agreement_fraction,
                    low_confidence: result.low_confidence,
                    termination: outcome.termination,
                    rounds: outcome.rounds.len(),
                }
            })
            .collect();

        Aggregation {
            configuration: FinalConfiguration {
                run_id: run.run_id().clone(),
                brief: run.brief().to_string(),
                mode: run.mode(),
                core,
                phase_decisions,
                status,
            },
            conflicts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::ClaimKind;
    use crate::discussion::{
        ConsensusEvaluator, Phase, PhaseOutcome, PhaseProgress, Position, RoleWeights,
        RoundRecord, Vote,
    };
    use crate::production::{DecisionFramework, ProductionRequest};

    fn session() -> SessionRun {
        let decision = DecisionFramework::default()
            .decide(&ProductionRequest::new("octopus", 50.0))
            .unwrap();
        SessionRun::new(RunId::new("run-7"), "octopus", DiscussionMode::Standard, decision)
    }

    fn agreed(phase: PhaseId, text: &str) -> PhaseOutcome {
        let mut progress = PhaseProgress::new(Phase::new(phase, 2, 0.5, vec![]));
        progress.begin_round();
        let positions = vec![Position::generated("editor", Vote::Agree, text, 1)];
        let result = ConsensusEvaluator::new(0.5).evaluate(1, &positions, &RoleWeights::new());
        progress.record_round(RoundRecord {
            round_index: 1,
            positions,
            result,
        });
        progress.finish()
    }

    #[test]
    fn test_aggregate_clean_run() {
        let mut run = session();
        run.record_phase(agreed(PhaseId::Script, "Open with a question."));
        run.record_phase(agreed(PhaseId::Visuals, "Macro shots of skin texture."));

        let aggregation = DecisionAggregator::new().aggregate(run);
        let config = aggregation.configuration;

        assert_eq!(config.status(), RunStatus::Completed);
        assert_eq!(config.core().clip_count(), 7);
        assert_eq!(config.phase_decisions().len(), 2);
        assert_eq!(
            config.decision_for(PhaseId::Visuals).map(|d| d.decision.as_str()),
            Some("Macro shots of skin texture.")
        );
        assert!(config.decision_for(PhaseId::Audio).is_none());
        assert!(aggregation.conflicts.is_empty());
    }

    #[test]
    fn test_aggregate_enforces_core_numbers() {
        let mut run = session();
        run.record_phase(agreed(PhaseId::Visuals, "Use 10 shots."));

        let aggregation = DecisionAggregator::new().aggregate(run);
        assert_eq!(
            aggregation.configuration.phase_decisions()[0].decision,
            "Use 7 shots."
        );
        assert_eq!(aggregation.conflicts.len(), 1);
        assert_eq!(aggregation.conflicts[0].kind, ClaimKind::ClipCount);
        // Rewriting text does not degrade the run.
        assert_eq!(aggregation.configuration.status(), RunStatus::Completed);
    }

    #[test]
    fn test_aggregate_without_phases() {
        let config = DecisionAggregator::new().aggregate(session()).configuration;
        assert_eq!(config.status(), RunStatus::Completed);
        assert!(config.phase_decisions().is_empty());
        assert_eq!(config.core().word_budget(), 112);
    }

    #[test]
    fn test_failed_status_is_preserved() {
        let mut run = session();
        run.fail();
        let config = DecisionAggregator::new().aggregate(run).configuration;
        assert_eq!(config.status(), RunStatus::Failed);
        assert!(config.is_degraded());
    }
}
