//! Resolve Production use case
//!
//! Entry point of the core: resolve the numeric decision, run the discussion
//! preset, and aggregate everything into a [`FinalConfiguration`].
//!
//! Only two errors ever reach the caller: an invalid request (rejected before
//! any text-generation call) and, when configured to fail on it, a total
//! outage of the text-generation service. Every other problem degrades the run.
//!
//! [`FinalConfiguration`]: reel_domain::FinalConfiguration

use crate::config::DiscussionParams;
use crate::ports::audit_sink::{AuditSink, NoAuditSink};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{DiscussionProgress, NoProgress};
use crate::use_cases::run_discussion::RunDiscussionUseCase;
use crate::use_cases::shared::append_audit;
use chrono::Utc;
use rand::Rng;
use reel_domain::{
    Aggregation, AuditRecord, DecisionAggregator, DecisionFramework, DiscussionMode, DomainError,
    ProductionRequest, RoleRegistry, RunId, SessionRun,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that can reach the caller of the core
#[derive(Error, Debug)]
pub enum ResolveProductionError {
    #[error(transparent)]
    InvalidRequest(#[from] DomainError),

    #[error("Text generation failed for every role (run {run_id})")]
    TotalOutage { run_id: RunId },
}

/// Input for the ResolveProduction use case
#[derive(Debug, Clone)]
pub struct ResolveProductionInput {
    pub request: ProductionRequest,
    pub mode: DiscussionMode,
}

impl ResolveProductionInput {
    pub fn new(request: ProductionRequest, mode: DiscussionMode) -> Self {
        Self { request, mode }
    }
}

/// Use case for resolving one production request
pub struct ResolveProductionUseCase<G: LlmGateway + 'static> {
    framework: DecisionFramework,
    registry: Arc<RoleRegistry>,
    discussion: RunDiscussionUseCase<G>,
    aggregator: DecisionAggregator,
    audit: Arc<dyn AuditSink>,
    fail_on_total_outage: bool,
}

impl<G: LlmGateway + 'static> ResolveProductionUseCase<G> {
    pub fn new(gateway: Arc<G>, registry: RoleRegistry, params: DiscussionParams) -> Self {
        let registry = Arc::new(registry);
        let fail_on_total_outage = params.fail_on_total_outage;
        Self {
            framework: DecisionFramework::default(),
            discussion: RunDiscussionUseCase::new(gateway, Arc::clone(&registry), params),
            registry,
            aggregator: DecisionAggregator::new(),
            audit: Arc::new(NoAuditSink),
            fail_on_total_outage,
        }
    }

    pub fn with_framework(mut self, framework: DecisionFramework) -> Self {
        self.framework = framework;
        self
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.discussion = self.discussion.with_audit_sink(Arc::clone(&sink));
        self.audit = sink;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.discussion = self.discussion.with_cancellation(token);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: ResolveProductionInput,
    ) -> Result<Aggregation, ResolveProductionError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: ResolveProductionInput,
        progress: &dyn DiscussionProgress,
    ) -> Result<Aggregation, ResolveProductionError> {
        let decision = self.framework.decide(&input.request)?;

        if decision.exceeds_platform_limit() {
            warn!(
                platform = %decision.platform(),
                duration = decision.total_duration(),
                "Requested duration exceeds the platform's maximum video length"
            );
        }

        let run_id = new_run_id();
        info!(
            run_id = %run_id,
            clips = decision.clip_count(),
            per_clip = decision.per_clip_duration_bound(),
            words = decision.word_budget(),
            mode = %input.mode,
            "Core decision resolved"
        );
        append_audit(
            self.audit.as_ref(),
            &run_id,
            AuditRecord::RunStarted {
                brief: input.request.brief.clone(),
                mode: input.mode,
                decision: decision.clone(),
            },
        );

        let mut run = SessionRun::new(run_id.clone(), input.request.brief, input.mode, decision);

        let phases = input.mode.phases(&self.registry);
        if phases.is_empty() {
            info!("Discussion disabled, using the core decision only");
        } else {
            self.discussion.execute(&mut run, phases, progress).await;
        }

        let total_outage = run.is_total_outage();
        if total_outage {
            warn!(run_id = %run_id, "Text generation failed for every role; phase decisions are empty");
            if self.fail_on_total_outage {
                run.fail();
            }
        }

        let aggregation = self.aggregator.aggregate(run);
        for conflict in &aggregation.conflicts {
            warn!("Core decision overrides phase text: {}", conflict.describe());
            append_audit(
                self.audit.as_ref(),
                &run_id,
                AuditRecord::ConflictResolved {
                    conflict: conflict.clone(),
                },
            );
        }

        let status = aggregation.configuration.status();
        append_audit(self.audit.as_ref(), &run_id, AuditRecord::RunFinished { status });
        info!(run_id = %run_id, status = %status, "Run finished");

        if total_outage && self.fail_on_total_outage {
            return Err(ResolveProductionError::TotalOutage { run_id });
        }
        Ok(aggregation)
    }
}

/// Timestamped run identifier with a short random suffix.
pub fn new_run_id() -> RunId {
    let suffix: u16 = rand::rng().random();
    RunId::new(format!("{}-{:04x}", Utc::now().format("%Y%m%dT%H%M%SZ"), suffix))
}
