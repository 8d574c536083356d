//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and application
//! types, reporting every problem as a [`ConfigIssue`].

mod audit;
mod discussion;
mod output;
mod production;
mod provider;
mod roles;

pub use audit::FileAuditConfig;
pub use discussion::{FileDiscussionConfig, FileRetryConfig};
pub use output::{FileOutputConfig, FileOutputFormat};
pub use production::FileProductionConfig;
pub use provider::FileProviderConfig;
pub use roles::FileRolesConfig;

use reel_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Decision Framework constants
    pub production: FileProductionConfig,
    /// Discussion preset, fan-out and timeouts
    pub discussion: FileDiscussionConfig,
    /// Role weight overrides
    pub roles: FileRolesConfig,
    /// Text-generation endpoint
    pub provider: FileProviderConfig,
    /// JSONL audit trail
    pub audit: FileAuditConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Errors make the configuration unusable; warnings name a value that
    /// was ignored in favour of its default.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.production.to_decision_params().1);
        issues.extend(self.discussion.parse_mode().1);
        issues.extend(self.discussion.to_discussion_params().1);
        issues.extend(self.roles.to_registry().1);
        issues.extend(self.provider.validate());

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_domain::{DiscussionMode, OutputFormat};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[production]
max_clip_duration = 8.0

[discussion]
mode = "light"
role_timeout_seconds = 30

[roles.weights]
creative_director = 2.0

[provider]
base_url = "http://localhost:11434/v1"
model = "llama3.1"

[audit]
enabled = false

[output]
format = "full"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.discussion.parse_mode().0, DiscussionMode::Light);
        assert_eq!(config.discussion.role_timeout_seconds, 30);
        assert_eq!(config.roles.weights.get("creative_director"), Some(&2.0));
        assert_eq!(config.provider.model, "llama3.1");
        assert!(!config.audit.enabled);
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[discussion]
mode = "deep"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.discussion.parse_mode().0, DiscussionMode::Deep);
        // Defaults should apply
        assert_eq!(config.production, FileProductionConfig::default());
        assert!(config.output.color);
        assert!(config.audit.enabled);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let toml_str = r#"
[production]
speech_rate = 0.0

[discussion]
mode = "marathon"
max_in_flight = 0

[roles.weights]
narrator = 1.0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert_eq!(issues.iter().filter(|i| i.is_error()).count(), 2);
        assert_eq!(issues.iter().filter(|i| !i.is_error()).count(), 2);
    }
}
