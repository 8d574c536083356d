//! JSONL file writer for the audit trail.
//!
//! Each [`AuditRecord`] is serialized as a single JSON line carrying its
//! `type` tag plus `run_id` and `timestamp`, appended through a buffered writer.

use chrono::{SecondsFormat, Utc};
use reel_application::ports::audit_sink::{AuditError, AuditSink};
use reel_domain::{AuditRecord, RunId};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Audit sink that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record and on `Drop`.
pub struct JsonlAuditSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAuditSink {
    /// Open (or create) the audit file at `path`, creating parent directories.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// New timestamped file inside `dir`, e.g. `20261019T101500Z.audit.jsonl`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Result<Self, AuditError> {
        let name = format!("{}.audit.jsonl", Utc::now().format("%Y%m%dT%H%M%S%.3fZ"));
        Self::new(dir.as_ref().join(name))
    }

    /// Get the path to the audit file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn to_line(run_id: &RunId, record: &AuditRecord) -> Result<String, AuditError> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut value = serde_json::to_value(record)?;
        if let Value::Object(map) = &mut value {
            map.insert("run_id".to_string(), Value::String(run_id.to_string()));
            map.insert("timestamp".to_string(), Value::String(timestamp));
        }
        Ok(serde_json::to_string(&value)?)
    }
}

impl AuditSink for JsonlAuditSink {
    fn append_audit_record(&self, run_id: &RunId, record: &AuditRecord) -> Result<(), AuditError> {
        let line = Self::to_line(run_id, record)?;

        // A poisoned lock only means another writer panicked mid-line; keep appending.
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}

impl Drop for JsonlAuditSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
