//! Shared utilities for use cases.

use crate::ports::audit_sink::AuditSink;
use reel_domain::{AuditRecord, RunId};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Append an audit record, logging (and otherwise ignoring) failures.
pub(crate) fn append_audit(sink: &dyn AuditSink, run_id: &RunId, record: AuditRecord) {
    if let Err(e) = sink.append_audit_record(run_id, &record) {
        warn!(run_id = %run_id, record = record.kind(), "Failed to write audit record: {}", e);
    }
}

/// Check if cancellation has been requested or the deadline has passed.
pub(crate) fn should_stop(token: &Option<CancellationToken>, deadline: Option<Instant>) -> bool {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return true;
    }
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// Resolves when the deadline passes; never resolves without one.
pub(crate) async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// Resolves when the token is cancelled; never resolves without one.
pub(crate) async fn cancelled(token: &Option<CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending::<()>().await,
    }
}
