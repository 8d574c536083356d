//! Run Discussion use case
//!
//! Drives the phases of a discussion strictly in order. Inside a round the
//! position requests fan out concurrently (bounded by `max_in_flight`), and
//! the collected positions are sorted by role id before evaluation.

use crate::config::DiscussionParams;
use crate::ports::audit_sink::{AuditSink, NoAuditSink};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::DiscussionProgress;
use crate::use_cases::generate_position::PositionGenerator;
use crate::use_cases::shared::{append_audit, cancelled, deadline_reached, should_stop};
use reel_domain::discussion::summarize_disagreement;
use reel_domain::{
    AuditRecord, ConsensusEvaluator, Phase, PhaseOutcome, PhaseProgress, Position, PositionSource,
    PromptTemplate, RoleRegistry, RoleWeights, RoundRecord, SessionRun, TopicContext,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Positions gathered for one round.
struct RoundCollection {
    /// Sorted by role id
    positions: Vec<Position>,
    /// The deadline passed or the run was cancelled mid-round
    interrupted: bool,
}

/// Use case for running the discussion phases of a session run
pub struct RunDiscussionUseCase<G: LlmGateway + 'static> {
    generator: PositionGenerator<G>,
    registry: Arc<RoleRegistry>,
    weights: RoleWeights,
    params: DiscussionParams,
    audit: Arc<dyn AuditSink>,
    cancellation_token: Option<CancellationToken>,
}

impl<G: LlmGateway + 'static> RunDiscussionUseCase<G> {
    pub fn new(gateway: Arc<G>, registry: Arc<RoleRegistry>, params: DiscussionParams) -> Self {
        let weights = registry.weights();
        Self {
            generator: PositionGenerator::new(gateway, params.retry),
            registry,
            weights,
            params,
            audit: Arc::new(NoAuditSink),
            cancellation_token: None,
        }
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = sink;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn params(&self) -> &DiscussionParams {
        &self.params
    }

    /// Run every phase in order, recording each outcome on `run`.
    ///
    /// Once the deadline passes or the run is cancelled, the current phase is
    /// finalized from what arrived, the remaining phases are skipped, and the
    /// run is marked degraded.
    pub async fn execute(
        &self,
        run: &mut SessionRun,
        phases: Vec<Phase>,
        progress: &dyn DiscussionProgress,
    ) {
        let deadline = self.params.run_deadline.map(|d| Instant::now() + d);
        let mut interrupted = false;

        info!(
            run_id = %run.run_id(),
            phases = phases.len(),
            "Starting discussion"
        );
        progress.on_discussion_start(phases.len());

        for phase in phases {
            if !interrupted && should_stop(&self.cancellation_token, deadline) {
                warn!("Discussion interrupted before phase {}", phase.id());
                interrupted = true;
            }

            let outcome = if interrupted {
                info!(phase = %phase.id(), "Skipping phase");
                PhaseOutcome::skipped(phase.id())
            } else if phase.participating_roles().is_empty() {
                info!(phase = %phase.id(), "No participating roles, skipping phase");
                PhaseOutcome::skipped(phase.id())
            } else {
                progress.on_phase_start(&phase);
                let (outcome, stopped) = self.run_phase(run, phase, deadline, progress).await;
                interrupted = stopped;
                outcome
            };

            info!(
                phase = %outcome.phase,
                termination = outcome.termination.as_str(),
                rounds = outcome.rounds.len(),
                agreement = outcome.final_result.agreement_fraction,
                "Phase finished"
            );
            append_audit(
                self.audit.as_ref(),
                run.run_id(),
                AuditRecord::PhaseFinished {
                    phase: outcome.phase,
                    termination: outcome.termination,
                    rounds: outcome.rounds.len(),
                    agreement_fraction: outcome.final_result.agreement_fraction,
                },
            );
            progress.on_phase_complete(&outcome);
            run.record_phase(outcome);
        }

        if interrupted {
            run.mark_degraded();
        }
    }

    /// Run one phase to termination. Returns the outcome and whether the
    /// discussion was interrupted.
    async fn run_phase(
        &self,
        run: &SessionRun,
        phase: Phase,
        deadline: Option<Instant>,
        progress: &dyn DiscussionProgress,
    ) -> (PhaseOutcome, bool) {
        let previous = run.previous_decisions();
        let topic = phase.render_topic(&TopicContext::new(run.brief(), run.decision(), &previous));
        let constraints = run.decision().hints_for(phase.id());
        let evaluator = ConsensusEvaluator::new(phase.consensus_threshold());

        let mut state = PhaseProgress::new(phase.clone());
        let mut summary: Option<String> = None;
        let mut interrupted = false;

        while let Some(round_index) = state.begin_round() {
            if should_stop(&self.cancellation_token, deadline) {
                state.interrupt(None);
                interrupted = true;
                break;
            }

            info!(phase = %phase.id(), round = round_index, "Starting round");
            progress.on_round_start(&phase, round_index, phase.participating_roles().len());

            let prompt = PromptTemplate::position_prompt(
                &phase,
                &topic,
                &constraints,
                round_index,
                summary.as_deref(),
            );
            let collection = self
                .collect_round(&phase, &prompt, round_index, deadline, progress)
                .await;

            for position in &collection.positions {
                append_audit(
                    self.audit.as_ref(),
                    run.run_id(),
                    AuditRecord::Position {
                        phase: phase.id(),
                        position: position.clone(),
                    },
                );
            }

            let result = evaluator.evaluate(round_index, &collection.positions, &self.weights);
            info!(
                phase = %phase.id(),
                round = round_index,
                agreement = result.agreement_fraction,
                threshold = phase.consensus_threshold(),
                terminated = result.terminated,
                "Round evaluated"
            );
            append_audit(
                self.audit.as_ref(),
                run.run_id(),
                AuditRecord::Consensus {
                    phase: phase.id(),
                    result: result.clone(),
                },
            );
            progress.on_round_complete(&phase, &result);

            let record = RoundRecord {
                round_index,
                positions: collection.positions,
                result,
            };

            if collection.interrupted {
                warn!(phase = %phase.id(), round = round_index, "Discussion interrupted mid-round");
                state.interrupt(Some(record));
                interrupted = true;
                break;
            }

            summary = Some(summarize_disagreement(
                &record.positions,
                &record.result,
                &self.registry,
            ));
            state.record_round(record);
        }

        (state.finish(), interrupted)
    }

    /// Fan out one position request per participating role.
    async fn collect_round(
        &self,
        phase: &Phase,
        prompt: &str,
        round_index: u32,
        deadline: Option<Instant>,
        progress: &dyn DiscussionProgress,
    ) -> RoundCollection {
        let semaphore = Arc::new(Semaphore::new(self.params.max_in_flight.max(1)));
        let role_timeout = self.params.role_timeout;
        let mut join_set = JoinSet::new();
        let mut expected = Vec::new();

        for role_id in phase.participating_roles() {
            let Some(role) = self.registry.get(role_id).cloned() else {
                warn!(role = %role_id, "Role is not registered, skipping");
                continue;
            };
            expected.push(role.id.clone());

            let generator = self.generator.clone();
            let semaphore = Arc::clone(&semaphore);
            let prompt = prompt.to_string();

            join_set.spawn(async move {
                // Queueing for a permit does not count against the role's timeout.
                let _permit = semaphore.acquire_owned().await.ok();
                let call = generator.generate_or_neutral(&role, &prompt, round_index);
                match tokio::time::timeout(role_timeout, call).await {
                    Ok(position) => position,
                    Err(_) => Position::fallback(
                        role.id.clone(),
                        round_index,
                        format!("timed out after {role_timeout:?}"),
                    ),
                }
            });
        }

        let mut positions = Vec::with_capacity(expected.len());
        let mut interrupted = false;

        loop {
            let joined = tokio::select! {
                joined = join_set.join_next() => joined,
                _ = deadline_reached(deadline) => {
                    interrupted = true;
                    None
                }
                _ = cancelled(&self.cancellation_token) => {
                    interrupted = true;
                    None
                }
            };

            match joined {
                Some(Ok(position)) => {
                    if let PositionSource::Fallback { reason } = &position.source {
                        warn!(role = %position.role_id, "Falling back to neutral: {}", reason);
                    } else {
                        debug!(role = %position.role_id, vote = %position.vote, "Position received");
                    }
                    progress.on_position(phase, &position);
                    positions.push(position);
                }
                Some(Err(e)) => warn!("Task join error: {}", e),
                None => break,
            }
        }

        if interrupted {
            join_set.abort_all();
        } else {
            for role_id in expected {
                if !positions.iter().any(|p| p.role_id == role_id) {
                    positions.push(Position::fallback(role_id, round_index, "position task failed"));
                }
            }
        }

        positions.sort_by(|a, b| a.role_id.cmp(&b.role_id));
        RoundCollection {
            positions,
            interrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use crate::ports::progress::NoProgress;
    use crate::retry::RetryPolicy;
    use crate::use_cases::testing::{
        BrokenAuditSink, RecordingAuditSink, ScriptedGateway, Step, agree, disagree, registry,
        unavailable,
    };
    use reel_domain::{
        DecisionFramework, DiscussionMode, PhaseId, PhaseTermination, ProductionRequest, RunId,
        RunStatus, Vote,
    };
    use std::time::Duration;

    fn session() -> SessionRun {
        let decision = DecisionFramework::default()
            .decide(&ProductionRequest::new("octopus camouflage", 50.0))
            .unwrap();
        SessionRun::new(
            RunId::new("test-run"),
            "octopus camouflage",
            DiscussionMode::Standard,
            decision,
        )
    }

    fn phase(id: PhaseId, roles: &[&str], max_rounds: u32, threshold: f64) -> Phase {
        Phase::new(
            id,
            max_rounds,
            threshold,
            roles.iter().map(|r| (*r).into()).collect(),
        )
    }

    fn params() -> DiscussionParams {
        DiscussionParams::default().with_retry(RetryPolicy::none())
    }

    fn use_case(gateway: ScriptedGateway, roles: &[&str]) -> RunDiscussionUseCase<ScriptedGateway> {
        RunDiscussionUseCase::new(Arc::new(gateway), Arc::new(registry(roles)), params())
    }

    #[tokio::test]
    async fn test_three_of_four_agree_terminates_in_first_round() {
        let gateway = ScriptedGateway::new()
            .script("a", vec![agree("Open on the eye")])
            .script("b", vec![agree("Fine")])
            .script("c", vec![agree("Fine")])
            .script("d", vec![disagree("Too dark")]);
        let roles = ["a", "b", "c", "d"];
        let use_case = use_case(gateway, &roles);

        let mut run = session();
        use_case
            .execute(&mut run, vec![phase(PhaseId::Script, &roles, 3, 0.7)], &NoProgress)
            .await;

        let outcome = &run.outcomes()[0];
        assert_eq!(outcome.termination, PhaseTermination::ConsensusReached);
        assert_eq!(outcome.rounds.len(), 1);
        assert_eq!(outcome.final_result.agreement_fraction, 0.75);
        assert_eq!(outcome.final_result.decision_text, "Open on the eye");
        assert_eq!(run.finish(), RunStatus::Completed);
    }

    #[tokio::test]
    async fn test_all_agree_is_one_round_at_full_agreement() {
        let gateway = ScriptedGateway::new()
            .script("a", vec![agree("yes")])
            .script("b", vec![agree("yes")]);
        let use_case = use_case(gateway, &["a", "b"]);

        let mut run = session();
        use_case
            .execute(&mut run, vec![phase(PhaseId::Audio, &["a", "b"], 3, 0.9)], &NoProgress)
            .await;

        let outcome = &run.outcomes()[0];
        assert_eq!(outcome.rounds.len(), 1);
        assert_eq!(outcome.final_result.agreement_fraction, 1.0);
    }

    #[tokio::test]
    async fn test_all_failures_exhaust_rounds_with_neutral_votes() {
        let gateway = ScriptedGateway::new()
            .script("a", vec![unavailable()])
            .script("b", vec![Step::Fail(GatewayError::RequestFailed("bad key".into()))]);
        let use_case = use_case(gateway, &["a", "b"]);

        let mut run = session();
        use_case
            .execute(&mut run, vec![phase(PhaseId::Script, &["a", "b"], 2, 0.5)], &NoProgress)
            .await;

        let outcome = &run.outcomes()[0];
        assert_eq!(outcome.termination, PhaseTermination::RoundsExhausted);
        assert_eq!(outcome.rounds.len(), 2);
        assert_eq!(outcome.final_result.agreement_fraction, 0.0);
        assert!(outcome.positions().all(|p| p.vote == Vote::Neutral && p.is_fallback()));
        assert!(run.is_total_outage());
        assert_eq!(run.finish(), RunStatus::Degraded);
    }

    #[tokio::test]
    async fn test_second_round_sees_disagreement_summary() {
        let gateway = ScriptedGateway::new()
            .script("a", vec![agree("Warm colors"), agree("Warm colors, softer light")])
            .script("b", vec![disagree("Warm colors clash with the reef"), agree("Softer light works")]);
        let gateway = Arc::new(gateway);
        let use_case = RunDiscussionUseCase::new(
            Arc::clone(&gateway),
            Arc::new(registry(&["a", "b"])),
            params(),
        );

        let mut run = session();
        use_case
            .execute(&mut run, vec![phase(PhaseId::Visuals, &["a", "b"], 3, 0.9)], &NoProgress)
            .await;

        let outcome = &run.outcomes()[0];
        assert_eq!(outcome.termination, PhaseTermination::ConsensusReached);
        assert_eq!(outcome.rounds.len(), 2);
        assert_eq!(outcome.final_result.round_index, 2);

        let prompts = gateway.prompts_for("b");
        assert_eq!(prompts.len(), 2);
        assert!(!prompts[0].contains("previous round"));
        assert!(prompts[1].contains("Round 1 reached 50% agreement."));
        assert!(prompts[1].contains("- B (disagree): Warm colors clash with the reef"));
    }

    #[tokio::test]
    async fn test_exhaustion_keeps_best_round() {
        let gateway = ScriptedGateway::new()
            .script("a", vec![agree("first"), disagree("second"), disagree("third")])
            .script("b", vec![disagree("no"), disagree("no"), disagree("no")]);
        let use_case = use_case(gateway, &["a", "b"]);

        let mut run = session();
        use_case
            .execute(&mut run, vec![phase(PhaseId::Script, &["a", "b"], 3, 0.9)], &NoProgress)
            .await;

        let outcome = &run.outcomes()[0];
        assert_eq!(outcome.termination, PhaseTermination::RoundsExhausted);
        assert_eq!(outcome.rounds.len(), 3);
        assert_eq!(outcome.final_result.round_index, 1);
        assert_eq!(outcome.final_result.decision_text, "first");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_role_times_out_to_neutral() {
        let gateway = ScriptedGateway::new()
            .script("a", vec![agree("yes")])
            .script("b", vec![agree("yes")])
            .script("c", vec![Step::Hang]);
        let use_case = RunDiscussionUseCase::new(
            Arc::new(gateway),
            Arc::new(registry(&["a", "b", "c"])),
            params().with_role_timeout(Duration::from_secs(5)),
        );

        let mut run = session();
        use_case
            .execute(&mut run, vec![phase(PhaseId::Script, &["a", "b", "c"], 1, 0.6)], &NoProgress)
            .await;

        let round = &run.outcomes()[0].rounds[0];
        let hung = &round.positions[2];
        assert_eq!(hung.role_id.as_str(), "c");
        assert_eq!(hung.vote, Vote::Neutral);
        assert!(hung.is_fallback());
        assert!((round.result.agreement_fraction - 2.0 / 3.0).abs() < 1e-9);
        assert!(round.result.terminated);
        // A fallback degrades the run even though consensus was reached.
        assert_eq!(run.finish(), RunStatus::Degraded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_in_flight_bounds_concurrency() {
        let ids = ["a", "b", "c", "d", "e"];
        let mut gateway = ScriptedGateway::new().with_latency(Duration::from_millis(100));
        for id in ids {
            gateway = gateway.script(id, vec![agree("ok")]);
        }
        let gateway = Arc::new(gateway);
        let use_case = RunDiscussionUseCase::new(
            Arc::clone(&gateway),
            Arc::new(registry(&ids)),
            params().with_max_in_flight(2),
        );

        let mut run = session();
        use_case
            .execute(&mut run, vec![phase(PhaseId::Script, &ids, 1, 0.5)], &NoProgress)
            .await;

        assert_eq!(gateway.calls(), 5);
        assert!(gateway.max_in_flight() <= 2);
        assert_eq!(run.outcomes()[0].final_result.agreement_fraction, 1.0);
    }

    #[tokio::test]
    async fn test_positions_sorted_by_role_id() {
        let ids = ["delta", "alpha", "charlie", "bravo"];
        let mut gateway = ScriptedGateway::new();
        for id in ids {
            gateway = gateway.script(id, vec![agree(id)]);
        }
        let use_case = use_case(gateway, &ids);

        let mut run = session();
        use_case
            .execute(&mut run, vec![phase(PhaseId::Script, &ids, 1, 0.5)], &NoProgress)
            .await;

        let order: Vec<&str> = run.outcomes()[0].rounds[0]
            .positions
            .iter()
            .map(|p| p.role_id.as_str())
            .collect();
        assert_eq!(order, vec!["alpha", "bravo", "charlie", "delta"]);
        assert_eq!(run.outcomes()[0].final_result.decision_text, "alpha");
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_finalizes_current_phase_and_skips_the_rest() {
        let gateway = ScriptedGateway::new()
            .script("a", vec![agree("keep it short")])
            .script("b", vec![Step::Hang]);
        let use_case = RunDiscussionUseCase::new(
            Arc::new(gateway),
            Arc::new(registry(&["a", "b"])),
            params()
                .with_role_timeout(Duration::from_secs(60))
                .with_run_deadline(Some(Duration::from_secs(10))),
        );

        let mut run = session();
        let phases = vec![
            phase(PhaseId::Script, &["a", "b"], 2, 0.9),
            phase(PhaseId::Visuals, &["a", "b"], 2, 0.9),
        ];
        use_case.execute(&mut run, phases, &NoProgress).await;

        let script = &run.outcomes()[0];
        assert_eq!(script.termination, PhaseTermination::Interrupted);
        assert_eq!(script.rounds.len(), 1);
        assert_eq!(script.rounds[0].positions.len(), 1);
        assert_eq!(script.final_result.decision_text, "keep it short");

        let visuals = &run.outcomes()[1];
        assert_eq!(visuals.termination, PhaseTermination::Skipped);
        assert_eq!(run.finish(), RunStatus::Degraded);
    }

    #[tokio::test]
    async fn test_cancelled_run_skips_every_phase() {
        let gateway = Arc::new(ScriptedGateway::new().script("a", vec![agree("yes")]));
        let token = CancellationToken::new();
        token.cancel();
        let use_case = RunDiscussionUseCase::new(
            Arc::clone(&gateway),
            Arc::new(registry(&["a"])),
            params(),
        )
        .with_cancellation(token);

        let mut run = session();
        use_case
            .execute(&mut run, vec![phase(PhaseId::Script, &["a"], 2, 0.5)], &NoProgress)
            .await;

        assert_eq!(gateway.calls(), 0);
        assert_eq!(run.outcomes()[0].termination, PhaseTermination::Skipped);
        assert_eq!(run.finish(), RunStatus::Degraded);
    }

    #[tokio::test]
    async fn test_phase_without_roles_is_skipped() {
        let gateway = Arc::new(ScriptedGateway::new());
        let use_case =
            RunDiscussionUseCase::new(Arc::clone(&gateway), Arc::new(registry(&["a"])), params());

        let mut run = session();
        use_case
            .execute(&mut run, vec![phase(PhaseId::Audio, &[], 2, 0.5)], &NoProgress)
            .await;

        assert_eq!(gateway.calls(), 0);
        assert_eq!(run.outcomes()[0].termination, PhaseTermination::Skipped);
        assert_eq!(run.outcomes()[0].final_result.decision_text, "");
    }

    #[tokio::test]
    async fn test_audit_records_positions_and_consensus() {
        let gateway = ScriptedGateway::new()
            .script("a", vec![agree("yes")])
            .script("b", vec![agree("yes")]);
        let sink = Arc::new(RecordingAuditSink::default());
        let use_case = use_case(gateway, &["a", "b"]).with_audit_sink(sink.clone());

        let mut run = session();
        use_case
            .execute(&mut run, vec![phase(PhaseId::Script, &["a", "b"], 1, 0.5)], &NoProgress)
            .await;

        assert_eq!(
            sink.kinds(),
            vec!["position", "position", "consensus", "phase_finished"]
        );
        let records = sink.records.lock().unwrap();
        assert!(records.iter().all(|(id, _)| id.as_str() == "test-run"));
    }

    #[tokio::test]
    async fn test_broken_audit_sink_does_not_change_outcome() {
        let gateway = ScriptedGateway::new().script("a", vec![agree("yes")]);
        let use_case = use_case(gateway, &["a"]).with_audit_sink(Arc::new(BrokenAuditSink));

        let mut run = session();
        use_case
            .execute(&mut run, vec![phase(PhaseId::Script, &["a"], 1, 0.5)], &NoProgress)
            .await;

        assert_eq!(run.outcomes()[0].termination, PhaseTermination::ConsensusReached);
        assert_eq!(run.finish(), RunStatus::Completed);
    }
}
