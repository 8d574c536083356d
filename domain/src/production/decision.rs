//! Decision Framework: deterministic production constraints.
//!
//! The framework splits the requested duration into balanced clips that never
//! exceed the synthesis backend's hard cap, and computes the narration word
//! budget up front so every downstream prompt can treat it as a hard limit.

use super::language::Language;
use super::platform::{Platform, Tolerance};
use crate::core::error::DomainError;
use crate::discussion::phase::PhaseId;
use serde::Serialize;

/// Longest clip the video synthesis backend accepts, in seconds.
pub const DEFAULT_MAX_CLIP_DURATION: f64 = 8.0;
/// Assumed narration speed in words per second.
pub const DEFAULT_SPEECH_RATE: f64 = 2.5;
/// Budget reduction compensating for text expansion during narration
/// (abbreviations and numbers read out in full).
pub const DEFAULT_SAFETY_FACTOR: f64 = 0.9;

/// Tunable constants of the Decision Framework.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecisionParams {
    pub max_clip_duration: f64,
    pub speech_rate: f64,
    pub safety_factor: f64,
}

impl Default for DecisionParams {
    fn default() -> Self {
        Self {
            max_clip_duration: DEFAULT_MAX_CLIP_DURATION,
            speech_rate: DEFAULT_SPEECH_RATE,
            safety_factor: DEFAULT_SAFETY_FACTOR,
        }
    }
}

impl DecisionParams {
    pub fn with_max_clip_duration(mut self, seconds: f64) -> Self {
        self.max_clip_duration = seconds;
        self
    }

    pub fn with_speech_rate(mut self, words_per_second: f64) -> Self {
        self.speech_rate = words_per_second;
        self
    }

    pub fn with_safety_factor(mut self, factor: f64) -> Self {
        self.safety_factor = factor;
        self
    }

    /// Reject parameters that would make the framework partial.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(self.max_clip_duration.is_finite() && self.max_clip_duration > 0.0) {
            return Err(DomainError::InvalidParameters(format!(
                "max_clip_duration must be positive, got {}",
                self.max_clip_duration
            )));
        }
        if !(self.speech_rate.is_finite() && self.speech_rate > 0.0) {
            return Err(DomainError::InvalidParameters(format!(
                "speech_rate must be positive, got {}",
                self.speech_rate
            )));
        }
        if !(self.safety_factor > 0.0 && self.safety_factor <= 1.0) {
            return Err(DomainError::InvalidParameters(format!(
                "safety_factor must be in (0, 1], got {}",
                self.safety_factor
            )));
        }
        Ok(())
    }
}

/// One generation request as supplied by the CLI/config layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionRequest {
    /// The creative brief the video is about
    pub brief: String,
    /// Requested total duration in seconds
    pub total_duration: f64,
    pub platform: Platform,
    pub language: Language,
    /// Explicit TTS voice; the language default is used otherwise
    pub voice_override: Option<String>,
}

impl ProductionRequest {
    pub fn new(brief: impl Into<String>, total_duration: f64) -> Self {
        Self {
            brief: brief.into(),
            total_duration,
            platform: Platform::default(),
            language: Language::default(),
            voice_override: None,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        let voice = voice.into();
        self.voice_override = if voice.trim().is_empty() {
            None
        } else {
            Some(voice)
        };
        self
    }
}

/// The numeric, non-negotiable production constraints (immutable).
///
/// Only [`DecisionFramework::decide`] constructs this record, which keeps
/// `clip_count * per_clip_duration_bound >= total_duration` true for every
/// instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreDecision {
    total_duration: f64,
    clip_count: u32,
    per_clip_duration_bound: f64,
    word_budget: u32,
    language: Language,
    platform: Platform,
    tolerance: Tolerance,
    voice: String,
    speech_rate: f64,
}

impl CoreDecision {
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn clip_count(&self) -> u32 {
        self.clip_count
    }

    pub fn per_clip_duration_bound(&self) -> f64 {
        self.per_clip_duration_bound
    }

    pub fn word_budget(&self) -> u32 {
        self.word_budget
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn speech_rate(&self) -> f64 {
        self.speech_rate
    }

    /// Upper end of the acceptable duration band.
    pub fn max_acceptable_duration(&self) -> f64 {
        self.tolerance.bounds(self.total_duration).1
    }

    /// Whether the requested duration is longer than the platform allows.
    pub fn exceeds_platform_limit(&self) -> bool {
        self.platform
            .max_duration()
            .is_some_and(|max| self.total_duration > max)
    }

    /// Constraint lines relevant to one discussion phase.
    ///
    /// These are injected verbatim into every role prompt of that phase.
    pub fn hints_for(&self, phase: PhaseId) -> Vec<String> {
        let duration = format!(
            "Total duration: {}s (±{}%)",
            format_seconds(self.total_duration),
            self.tolerance.percent()
        );
        let clips = format!(
            "{} clips, each at most {}s",
            self.clip_count,
            format_seconds(self.per_clip_duration_bound)
        );
        let words = format!(
            "Narration must not exceed {} words ({} language)",
            self.word_budget, self.language
        );
        let voice = format!(
            "Voice: {} at about {} words per second",
            self.voice, self.speech_rate
        );
        let platform = format!("Platform: {}", self.platform.display_name());

        match phase {
            PhaseId::Concept => vec![duration, platform, words],
            PhaseId::Script => vec![words, duration, clips],
            PhaseId::Audio => vec![voice, duration, words],
            PhaseId::Visuals => vec![clips, duration, platform],
            PhaseId::Assembly => vec![clips, duration, words, voice, platform],
        }
    }
}

/// Format seconds with at most two decimals, trimming trailing zeros.
pub fn format_seconds(seconds: f64) -> String {
    let formatted = format!("{:.2}", seconds);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Pure resolver from a [`ProductionRequest`] to a [`CoreDecision`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionFramework {
    params: DecisionParams,
}

impl DecisionFramework {
    pub fn new(params: DecisionParams) -> Result<Self, DomainError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &DecisionParams {
        &self.params
    }

    /// Derive the production constraints for one request.
    ///
    /// Total for every positive, finite duration up to
    /// [`max_total_duration`](Self::max_total_duration). Non-positive or
    /// non-finite durations are rejected with [`DomainError::InvalidDuration`],
    /// longer ones with [`DomainError::DurationTooLong`].
    pub fn decide(&self, request: &ProductionRequest) -> Result<CoreDecision, DomainError> {
        let total = request.total_duration;
        let (clip_count, per_clip_duration_bound) = self.clip_plan(total)?;

        let voice = request
            .voice_override
            .clone()
            .unwrap_or_else(|| request.language.default_voice().to_string());

        Ok(CoreDecision {
            total_duration: total,
            clip_count,
            per_clip_duration_bound,
            word_budget: self.word_budget(total)?,
            language: request.language.clone(),
            platform: request.platform.clone(),
            tolerance: request.platform.tolerance(),
            voice,
            speech_rate: self.params.speech_rate,
        })
    }

    /// Balanced clip split: `(clip_count, per_clip_duration_bound)`.
    pub fn clip_plan(&self, total: f64) -> Result<(u32, f64), DomainError> {
        validate_duration(total)?;

        let clips = (total / self.params.max_clip_duration).ceil().max(1.0);
        if clips > f64::from(u32::MAX) {
            return Err(self.too_long(total));
        }
        let clip_count = clips as u32;
        let count = f64::from(clip_count);

        let mut per_clip = total / count;
        // Division can round down by one ulp; nudge up until the clips cover the total.
        while per_clip * count < total {
            per_clip = f64::from_bits(per_clip.to_bits() + 1);
        }

        Ok((clip_count, per_clip))
    }

    /// Narration word budget: `floor(total * speech_rate * safety_factor)`.
    pub fn word_budget(&self, total: f64) -> Result<u32, DomainError> {
        validate_duration(total)?;
        let budget = (total * self.params.speech_rate * self.params.safety_factor).floor();
        if budget > f64::from(u32::MAX) {
            return Err(self.too_long(total));
        }
        Ok(budget as u32)
    }

    /// Longest duration whose clip count and word budget still fit in `u32`.
    pub fn max_total_duration(&self) -> f64 {
        let limit = f64::from(u32::MAX);
        let by_clips = limit * self.params.max_clip_duration;
        let by_words = limit / (self.params.speech_rate * self.params.safety_factor);
        by_clips.min(by_words)
    }

    fn too_long(&self, total: f64) -> DomainError {
        DomainError::DurationTooLong {
            duration: total,
            max: self.max_total_duration(),
        }
    }
}

fn validate_duration(total: f64) -> Result<(), DomainError> {
    if total.is_finite() && total > 0.0 {
        Ok(())
    } else {
        Err(DomainError::InvalidDuration(total))
    }
}
