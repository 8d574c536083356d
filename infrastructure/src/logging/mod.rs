//! Logging infrastructure: the machine-readable audit trail.
//!
//! Provides [`JsonlAuditSink`], a JSONL file writer that implements the
//! [`AuditSink`](reel_application::AuditSink) port.

mod jsonl_audit_sink;

pub use jsonl_audit_sink::JsonlAuditSink;
