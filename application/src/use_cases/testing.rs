//! Scripted gateway shared by the use case tests.

use crate::ports::audit_sink::{AuditError, AuditSink};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use async_trait::async_trait;
use reel_domain::{AuditRecord, PhaseId, Role, RoleRegistry, RunId};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted reaction of a role.
#[derive(Debug, Clone)]
pub enum Step {
    Reply(String),
    Fail(GatewayError),
    /// Never answers within any reasonable timeout
    Hang,
}

pub fn agree(text: &str) -> Step {
    Step::Reply(format!("VOTE: AGREE\nRATIONALE: {text}"))
}

pub fn disagree(text: &str) -> Step {
    Step::Reply(format!("VOTE: DISAGREE\nRATIONALE: {text}"))
}

pub fn unavailable() -> Step {
    Step::Fail(GatewayError::ServiceUnavailable("503 from upstream".into()))
}

/// Gateway that answers per role, identified by the persona line
/// `role:<id>` at the start of the system prompt.
///
/// Each role replays its steps in order; the last step repeats once the
/// script runs out.
pub struct ScriptedGateway {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    prompts: Mutex<Vec<(String, String)>>,
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            prompts: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn script(self, role: &str, steps: Vec<Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(role.to_string(), steps.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// User prompts sent to `role`, in call order.
    pub fn prompts_for(&self, role: &str) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r == role)
            .map(|(_, p)| p.clone())
            .collect()
    }

    fn next_step(&self, role: &str) -> Step {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(role) {
            Some(steps) if steps.len() > 1 => steps.pop_front().unwrap(),
            Some(steps) => steps.front().cloned().unwrap_or_else(unavailable),
            None => unavailable(),
        }
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GatewayError> {
        let role = system_prompt
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("role:"))
            .unwrap_or_default()
            .to_string();

        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((role.clone(), prompt.to_string()));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let step = self.next_step(&role);
        if matches!(step, Step::Hang) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match step {
            Step::Reply(text) => Ok(text),
            Step::Fail(e) => Err(e),
            Step::Hang => Err(GatewayError::Timeout),
        }
    }
}

/// Registry of roles `a`, `b`, ... taking part in every phase.
pub fn registry(ids: &[&str]) -> RoleRegistry {
    RoleRegistry::from_roles(
        ids.iter()
            .map(|id| {
                Role::new(*id, id.to_uppercase())
                    .with_persona(format!("role:{id}"))
                    .with_phases(&PhaseId::ALL)
            })
            .collect(),
    )
}

/// Audit sink that keeps records in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    pub records: Mutex<Vec<(RunId, AuditRecord)>>,
}

impl RecordingAuditSink {
    pub fn kinds(&self) -> Vec<&'static str> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|(_, r)| r.kind())
            .collect()
    }
}

impl AuditSink for RecordingAuditSink {
    fn append_audit_record(&self, run_id: &RunId, record: &AuditRecord) -> Result<(), AuditError> {
        self.records
            .lock()
            .unwrap()
            .push((run_id.clone(), record.clone()));
        Ok(())
    }
}

/// Audit sink that always fails.
pub struct BrokenAuditSink;

impl AuditSink for BrokenAuditSink {
    fn append_audit_record(&self, _run_id: &RunId, _record: &AuditRecord) -> Result<(), AuditError> {
        Err(AuditError::Io(std::io::Error::other("disk full")))
    }
}
