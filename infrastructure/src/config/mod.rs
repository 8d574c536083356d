//! Configuration file loading for reel-quorum
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./reel-quorum.toml` or `./.reel-quorum.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/reel-quorum/config.toml`
//! 4. Default values
//!
//! CLI flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    FileAuditConfig, FileConfig, FileDiscussionConfig, FileOutputConfig, FileOutputFormat,
    FileProductionConfig, FileProviderConfig, FileRetryConfig, FileRolesConfig,
};
pub use loader::{ConfigLoader, ConfigValidationError};
