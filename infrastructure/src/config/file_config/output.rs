//! Output configuration from TOML (`[output]` section)

use reel_domain::OutputFormat;
use serde::{Deserialize, Serialize};

pub use reel_domain::OutputFormat as FileOutputFormat;

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// `full`, `summary` or `json`; the CLI flag takes precedence
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}
