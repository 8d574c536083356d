//! Text-generation provider configuration from TOML (`[provider]` section)
//!
//! Any endpoint speaking the OpenAI chat-completions protocol works:
//!
//! ```toml
//! [provider]
//! base_url = "https://api.openai.com/v1"
//! model = "gpt-4o-mini"
//! api_key_env = "OPENAI_API_KEY"   # read the key from this variable
//! max_tokens = 600
//! temperature = 0.7
//! request_timeout_seconds = 45
//! ```

use super::production::out_of_range;
use reel_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead)
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_seconds: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            max_tokens: 600,
            temperature: 0.7,
            request_timeout_seconds: 45,
        }
    }
}

impl FileProviderConfig {
    /// The configured key, else the value of `api_key_env`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (field, value) in [("provider.base_url", &self.base_url), ("provider.model", &self.model)] {
            if value.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyValue {
                        field: field.to_string(),
                    },
                    format!("{field} cannot be empty"),
                ));
            }
        }
        if self.max_tokens == 0 {
            issues.push(out_of_range("provider.max_tokens", "cannot be 0".to_string()));
        }
        if self.request_timeout_seconds == 0 {
            issues.push(out_of_range(
                "provider.request_timeout_seconds",
                "cannot be 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "provider.temperature".to_string(),
                },
                format!(
                    "provider.temperature: {} is outside [0, 2]; the provider may reject it",
                    self.temperature
                ),
            ));
        }

        issues
    }
}
