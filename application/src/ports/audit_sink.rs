//! Port for the run audit trail.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while the audit sink records every position,
//! consensus result and conflict of a run in a machine-readable form.

use reel_domain::{AuditRecord, RunId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Audit I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audit serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Port for persisting audit records.
///
/// Callers log failures and carry on; a broken audit trail never changes the
/// outcome of a run.
pub trait AuditSink: Send + Sync {
    fn append_audit_record(&self, run_id: &RunId, record: &AuditRecord) -> Result<(), AuditError>;
}

/// No-op implementation for tests and `--no-audit`.
pub struct NoAuditSink;

impl AuditSink for NoAuditSink {
    fn append_audit_record(&self, _run_id: &RunId, _record: &AuditRecord) -> Result<(), AuditError> {
        Ok(())
    }
}
