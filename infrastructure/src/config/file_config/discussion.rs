//! Discussion configuration from TOML (`[discussion]` section)
//!
//! ```toml
//! [discussion]
//! mode = "standard"               # "off", "light", "standard", "deep"
//! max_in_flight = 4               # concurrent text-generation calls per round
//! role_timeout_seconds = 60       # one role's call, retries included
//! deadline_seconds = 300          # optional wall-clock budget for the run
//! fail_on_total_outage = false
//!
//! [discussion.retry]
//! max_attempts = 3
//! base_delay_ms = 250
//! max_delay_ms = 4000
//! ```

use super::production::out_of_range;
use reel_application::{DiscussionParams, RetryPolicy};
use reel_domain::{ConfigIssue, ConfigIssueCode, DiscussionMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay_ms,
            max_delay_ms: policy.max_delay_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    /// Discussion preset: "off", "light", "standard", "deep"
    pub mode: String,
    pub max_in_flight: usize,
    pub role_timeout_seconds: u64,
    pub deadline_seconds: Option<u64>,
    pub fail_on_total_outage: bool,
    pub retry: FileRetryConfig,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        let params = DiscussionParams::default();
        Self {
            mode: DiscussionMode::default().to_string(),
            max_in_flight: params.max_in_flight,
            role_timeout_seconds: params.role_timeout.as_secs(),
            deadline_seconds: None,
            fail_on_total_outage: params.fail_on_total_outage,
            retry: FileRetryConfig::default(),
        }
    }
}

impl FileDiscussionConfig {
    /// Parse mode string into DiscussionMode, returning warnings on failure.
    pub fn parse_mode(&self) -> (DiscussionMode, Vec<ConfigIssue>) {
        match self.mode.parse::<DiscussionMode>() {
            Ok(mode) => (mode, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "discussion.mode".to_string(),
                        value: self.mode.clone(),
                        valid_values: ["off", "light", "standard", "deep"]
                            .iter()
                            .map(|s| s.to_string())
                            .collect(),
                    },
                    format!(
                        "discussion.mode: unknown value '{}', falling back to '{}'",
                        self.mode,
                        DiscussionMode::default()
                    ),
                );
                (DiscussionMode::default(), vec![issue])
            }
        }
    }

    /// Convert into runtime parameters, collecting every range problem.
    pub fn to_discussion_params(&self) -> (DiscussionParams, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        if self.max_in_flight == 0 {
            issues.push(out_of_range(
                "discussion.max_in_flight",
                "must be at least 1".to_string(),
            ));
        }
        if self.role_timeout_seconds == 0 {
            issues.push(out_of_range(
                "discussion.role_timeout_seconds",
                "cannot be 0".to_string(),
            ));
        }
        match self.deadline_seconds {
            Some(0) => issues.push(out_of_range(
                "discussion.deadline_seconds",
                "cannot be 0; omit it to disable the deadline".to_string(),
            )),
            Some(deadline) if deadline < self.role_timeout_seconds => {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::DeadlineBelowRoleTimeout,
                    format!(
                        "discussion.deadline_seconds ({deadline}) is shorter than \
                         role_timeout_seconds ({}); slow roles will be cut off by the deadline",
                        self.role_timeout_seconds
                    ),
                ));
            }
            _ => {}
        }
        if self.retry.max_attempts == 0 {
            issues.push(out_of_range(
                "discussion.retry.max_attempts",
                "must be at least 1".to_string(),
            ));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "discussion.retry.max_delay_ms".to_string(),
                },
                format!(
                    "discussion.retry.max_delay_ms ({}) is below base_delay_ms ({}); using base_delay_ms",
                    self.retry.max_delay_ms, self.retry.base_delay_ms
                ),
            ));
        }

        let retry = RetryPolicy::default()
            .with_max_attempts(self.retry.max_attempts)
            .with_delays(self.retry.base_delay_ms, self.retry.max_delay_ms);

        let params = DiscussionParams::default()
            .with_max_in_flight(self.max_in_flight)
            .with_role_timeout(Duration::from_secs(self.role_timeout_seconds))
            .with_run_deadline(self.deadline_seconds.map(Duration::from_secs))
            .with_retry(retry)
            .with_fail_on_total_outage(self.fail_on_total_outage);

        (params, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discussion_config_default() {
        let config = FileDiscussionConfig::default();
        assert_eq!(config.mode, "standard");
        assert_eq!(config.max_in_flight, 4);
        assert!(config.deadline_seconds.is_none());

        let (params, issues) = config.to_discussion_params();
        assert!(issues.is_empty());
        assert_eq!(params, DiscussionParams::default());
    }

    #[test]
    fn test_discussion_config_deserialize() {
        let toml_str = r#"
[discussion]
mode = "deep"
max_in_flight = 2
deadline_seconds = 300

[discussion.retry]
max_attempts = 5
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.discussion.parse_mode().0, DiscussionMode::Deep);

        let (params, issues) = config.discussion.to_discussion_params();
        assert!(issues.is_empty());
        assert_eq!(params.max_in_flight, 2);
        assert_eq!(params.run_deadline, Some(Duration::from_secs(300)));
        assert_eq!(params.retry.max_attempts, 5);
        assert_eq!(params.retry.base_delay_ms, 250);
    }

    #[test]
    fn test_unknown_mode_warns_and_falls_back() {
        let config = FileDiscussionConfig {
            mode: "exhaustive".to_string(),
            ..Default::default()
        };
        let (mode, issues) = config.parse_mode();
        assert_eq!(mode, DiscussionMode::Standard);
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn test_zero_values_are_errors() {
        let config = FileDiscussionConfig {
            max_in_flight: 0,
            role_timeout_seconds: 0,
            deadline_seconds: Some(0),
            ..Default::default()
        };
        let (_, issues) = config.to_discussion_params();
        assert_eq!(issues.iter().filter(|i| i.is_error()).count(), 3);
    }

    #[test]
    fn test_short_deadline_warns() {
        let config = FileDiscussionConfig {
            deadline_seconds: Some(30),
            ..Default::default()
        };
        let (_, issues) = config.to_discussion_params();
        assert!(matches!(
            issues.as_slice(),
            [ConfigIssue {
                code: ConfigIssueCode::DeadlineBelowRoleTimeout,
                ..
            }]
        ));
    }
}
