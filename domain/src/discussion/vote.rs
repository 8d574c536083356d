//! Votes and role positions

use super::role::RoleId;
use serde::{Deserialize, Serialize};

/// A role's stance on the current proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Agree,
    Disagree,
    Neutral,
}

impl Vote {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vote::Agree => "agree",
            Vote::Disagree => "disagree",
            Vote::Neutral => "neutral",
        }
    }

    /// Single-character marker used in vote summaries
    pub fn symbol(&self) -> char {
        match self {
            Vote::Agree => '●',
            Vote::Disagree => '○',
            Vote::Neutral => '◌',
        }
    }
}

impl std::fmt::Display for Vote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a position came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionSource {
    /// Parsed from a text-generation reply
    Generated,
    /// Substituted after a failure, timeout or interruption
    Fallback { reason: String },
}

/// One role's stance in one round.
///
/// # Example
///
/// ```
/// use reel_domain::discussion::{Position, Vote};
///
/// let position = Position::generated("editor", Vote::Agree, "Cut on the beat.", 1);
/// assert!(!position.is_fallback());
///
/// let fallback = Position::fallback("editor", 1, "timed out after 30s");
/// assert_eq!(fallback.vote, Vote::Neutral);
/// assert!(fallback.rationale.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub role_id: RoleId,
    pub vote: Vote,
    pub rationale: String,
    /// 1-based round number
    pub round_index: u32,
    pub source: PositionSource,
}

impl Position {
    pub fn generated(
        role_id: impl Into<RoleId>,
        vote: Vote,
        rationale: impl Into<String>,
        round_index: u32,
    ) -> Self {
        Self {
            role_id: role_id.into(),
            vote,
            rationale: rationale.into(),
            round_index,
            source: PositionSource::Generated,
        }
    }

    /// Neutral stand-in for a role that did not answer.
    pub fn fallback(role_id: impl Into<RoleId>, round_index: u32, reason: impl Into<String>) -> Self {
        Self {
            role_id: role_id.into(),
            vote: Vote::Neutral,
            rationale: String::new(),
            round_index,
            source: PositionSource::Fallback {
                reason: reason.into(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, PositionSource::Fallback { .. })
    }
}
