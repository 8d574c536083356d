//! Infrastructure layer for reel-quorum
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAuditConfig, FileConfig, FileDiscussionConfig,
    FileOutputConfig, FileOutputFormat, FileProductionConfig, FileProviderConfig,
};
pub use logging::JsonlAuditSink;
pub use providers::{OpenAiConfig, OpenAiGateway};
