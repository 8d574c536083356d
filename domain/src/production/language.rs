//! Narration language value object

use serde::{Deserialize, Serialize};

/// Narration language as a lowercase BCP-47-ish tag (e.g. `en`, `pt-br`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    /// Create a language tag. Blank input falls back to English.
    pub fn new(tag: impl AsRef<str>) -> Self {
        let tag = tag.as_ref().trim().to_lowercase().replace('_', "-");
        if tag.is_empty() {
            Self::default()
        } else {
            Self(tag)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Primary subtag (`pt-br` -> `pt`)
    pub fn primary(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// Default TTS voice for this language when none is requested.
    pub fn default_voice(&self) -> &'static str {
        match self.primary() {
            "en" => "en-US-narrator",
            "es" => "es-ES-narrator",
            "fr" => "fr-FR-narrator",
            "de" => "de-DE-narrator",
            "pt" => "pt-BR-narrator",
            "it" => "it-IT-narrator",
            "ja" => "ja-JP-narrator",
            "he" => "he-IL-narrator",
            _ => "multilingual-narrator",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Language {
    fn from(s: &str) -> Self {
        Language::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(Language::new(" PT_BR ").as_str(), "pt-br");
        assert_eq!(Language::new("pt-BR").primary(), "pt");
        assert_eq!(Language::new("").as_str(), "en");
    }

    #[test]
    fn test_default_voice() {
        assert_eq!(Language::new("en-GB").default_voice(), "en-US-narrator");
        assert_eq!(Language::new("sw").default_voice(), "multilingual-narrator");
    }
}
