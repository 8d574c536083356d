//! Audit trail configuration from TOML (`[audit]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ```toml
/// [audit]
/// enabled = true
/// dir = "~/.local/share/reel-quorum/audit"   # one JSONL file per run
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuditConfig {
    pub enabled: bool,
    pub dir: Option<PathBuf>,
}

impl Default for FileAuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

impl FileAuditConfig {
    /// Configured directory, else `$XDG_DATA_HOME/reel-quorum/audit`.
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from(".reel-quorum"))
                .join("reel-quorum")
                .join("audit")
        })
    }
}
