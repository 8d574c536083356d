//! Run-scoped state: the session run and its audit records

pub mod audit;
pub mod run;

pub use audit::AuditRecord;
pub use run::{RunId, RunStatus, SessionRun};
