//! Production configuration from TOML (`[production]` section)
//!
//! ```toml
//! [production]
//! max_clip_duration = 8.0    # seconds the video backend accepts per clip
//! speech_rate = 2.5          # narration words per second
//! safety_factor = 0.9        # word budget reduction, in (0, 1]
//! ```

use reel_domain::production::decision::{
    DEFAULT_MAX_CLIP_DURATION, DEFAULT_SAFETY_FACTOR, DEFAULT_SPEECH_RATE,
};
use reel_domain::{ConfigIssue, ConfigIssueCode, DecisionParams};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProductionConfig {
    pub max_clip_duration: f64,
    pub speech_rate: f64,
    pub safety_factor: f64,
}

impl Default for FileProductionConfig {
    fn default() -> Self {
        Self {
            max_clip_duration: DEFAULT_MAX_CLIP_DURATION,
            speech_rate: DEFAULT_SPEECH_RATE,
            safety_factor: DEFAULT_SAFETY_FACTOR,
        }
    }
}

impl FileProductionConfig {
    /// Convert into framework parameters.
    ///
    /// Every out-of-range value is an error: the framework cannot produce a
    /// decision without valid constants.
    pub fn to_decision_params(&self) -> (DecisionParams, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        if !(self.max_clip_duration.is_finite() && self.max_clip_duration > 0.0) {
            issues.push(out_of_range(
                "production.max_clip_duration",
                format!("must be a positive number of seconds, got {}", self.max_clip_duration),
            ));
        }
        if !(self.speech_rate.is_finite() && self.speech_rate > 0.0) {
            issues.push(out_of_range(
                "production.speech_rate",
                format!("must be a positive words-per-second rate, got {}", self.speech_rate),
            ));
        }
        if !(self.safety_factor > 0.0 && self.safety_factor <= 1.0) {
            issues.push(out_of_range(
                "production.safety_factor",
                format!("must be in (0, 1], got {}", self.safety_factor),
            ));
        }

        let params = DecisionParams::default()
            .with_max_clip_duration(self.max_clip_duration)
            .with_speech_rate(self.speech_rate)
            .with_safety_factor(self.safety_factor);
        (params, issues)
    }
}

pub(super) fn out_of_range(field: &str, detail: String) -> ConfigIssue {
    ConfigIssue::error(
        ConfigIssueCode::OutOfRange {
            field: field.to_string(),
        },
        format!("{field}: {detail}"),
    )
}
