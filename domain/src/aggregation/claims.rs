//! Numeric claims in decision text
//!
//! Role rationales are free text and regularly restate numbers ("9 clips",
//! "about 150 words", "a 70s cut"). The core decision is authoritative, so
//! any claim that contradicts it is rewritten and reported.

use crate::discussion::PhaseId;
use crate::production::CoreDecision;
use crate::production::decision::format_seconds;
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    /// `<n> clips|shots|scenes|segments`
    ClipCount,
    /// `<n> words`
    WordCount,
    /// `<n> seconds|sec|s`
    Seconds,
}

impl ClaimKind {
    fn from_unit(unit: &str) -> Option<Self> {
        match unit {
            "clip" | "clips" | "shot" | "shots" | "scene" | "scenes" | "segment" | "segments" => {
                Some(ClaimKind::ClipCount)
            }
            "word" | "words" => Some(ClaimKind::WordCount),
            "s" | "sec" | "secs" | "second" | "seconds" => Some(ClaimKind::Seconds),
            _ => None,
        }
    }

    fn format(&self, value: f64) -> String {
        match self {
            ClaimKind::ClipCount | ClaimKind::WordCount => format!("{}", value.round() as u64),
            ClaimKind::Seconds => format_seconds(value),
        }
    }
}

/// A number followed by a recognized unit.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericClaim {
    pub kind: ClaimKind,
    pub value: f64,
    /// Byte range of the number itself
    pub span: Range<usize>,
}

/// A claim that contradicted the core decision and was rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationConflict {
    pub phase: PhaseId,
    pub kind: ClaimKind,
    pub stated: f64,
    pub enforced: f64,
}

impl AggregationConflict {
    pub fn describe(&self) -> String {
        let unit = match self.kind {
            ClaimKind::ClipCount => "clips",
            ClaimKind::WordCount => "words",
            ClaimKind::Seconds => "seconds",
        };
        format!(
            "{} stated {} {unit}; using {}",
            self.phase.display_name(),
            self.kind.format(self.stated),
            self.kind.format(self.enforced)
        )
    }
}

fn continues_word(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'.'
}

/// `,ddd` not followed by another digit: a thousands group.
fn is_thousands_group(bytes: &[u8], at: usize) -> bool {
    bytes.len() >= at + 4
        && bytes[at] == b','
        && bytes[at + 1..at + 4].iter().all(u8::is_ascii_digit)
        && bytes.get(at + 4).is_none_or(|b| !b.is_ascii_digit())
}

/// The tail of a malformed grouping such as `1,2000`.
fn follows_digit_comma(bytes: &[u8], at: usize) -> bool {
    at >= 2 && bytes[at - 1] == b',' && bytes[at - 2].is_ascii_digit()
}

/// Scan `text` for numeric claims, in order of appearance.
pub fn find_numeric_claims(text: &str) -> Vec<NumericClaim> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut claims = Vec::new();
    let mut i = 0;

    while i < len {
        if !bytes[i].is_ascii_digit()
            || (i > 0 && continues_word(bytes[i - 1]))
            || follows_digit_comma(bytes, i)
        {
            i += 1;
            continue;
        }

        let start = i;
        while i < len && bytes[i].is_ascii_digit() {
            i += 1;
        }
        // "1,200"
        while is_thousands_group(bytes, i) {
            i += 4;
        }
        if i + 1 < len && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
            i += 1;
            while i < len && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        let end = i;

        // "7 clips", "7-clip", "8s"
        let mut unit_start = end;
        if unit_start < len && (bytes[unit_start] == b' ' || bytes[unit_start] == b'-') {
            unit_start += 1;
        }
        let mut unit_end = unit_start;
        while unit_end < len && bytes[unit_end].is_ascii_alphabetic() {
            unit_end += 1;
        }

        let unit = text[unit_start..unit_end].to_ascii_lowercase();
        if let Some(kind) = ClaimKind::from_unit(&unit)
            && let Ok(value) = text[start..end].replace(',', "").parse::<f64>()
        {
            claims.push(NumericClaim {
                kind,
                value,
                span: start..end,
            });
        }
    }

    claims
}

/// Rewrite claims in `text` that contradict `decision`.
///
/// - clip counts must equal the decided clip count
/// - word counts must not exceed the word budget
/// - durations must not exceed the tolerated maximum
pub fn enforce_core_numbers(
    phase: PhaseId,
    text: &str,
    decision: &CoreDecision,
) -> (String, Vec<AggregationConflict>) {
    let mut rewritten = String::with_capacity(text.len());
    let mut conflicts = Vec::new();
    let mut cursor = 0;

    for claim in find_numeric_claims(text) {
        let enforced = match claim.kind {
            ClaimKind::ClipCount if claim.value != f64::from(decision.clip_count()) => {
                Some(f64::from(decision.clip_count()))
            }
            ClaimKind::WordCount if claim.value > f64::from(decision.word_budget()) => {
                Some(f64::from(decision.word_budget()))
            }
            ClaimKind::Seconds if claim.value > decision.max_acceptable_duration() => {
                Some(decision.total_duration())
            }
            _ => None,
        };

        if let Some(enforced) = enforced {
            rewritten.push_str(&text[cursor..claim.span.start]);
            rewritten.push_str(&claim.kind.format(enforced));
            cursor = claim.span.end;
            conflicts.push(AggregationConflict {
                phase,
                kind: claim.kind,
                stated: claim.value,
                enforced,
            });
        }
    }
    rewritten.push_str(&text[cursor..]);

    (rewritten, conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::production::{DecisionFramework, ProductionRequest};

    fn decision() -> CoreDecision {
        // 50s: 7 clips, 112 words, YouTube Shorts tolerance 10% -> max 55s
        DecisionFramework::default()
            .decide(&ProductionRequest::new("octopus", 50.0))
            .unwrap()
    }

    #[test]
    fn test_find_claims() {
        let claims = find_numeric_claims("Use 9 clips, 150 words, a 7-shot intro and an 8s outro.");
        let found: Vec<(ClaimKind, f64)> = claims.iter().map(|c| (c.kind, c.value)).collect();
        assert_eq!(
            found,
            vec![
                (ClaimKind::ClipCount, 9.0),
                (ClaimKind::WordCount, 150.0),
                (ClaimKind::ClipCount, 7.0),
                (ClaimKind::Seconds, 8.0),
            ]
        );
    }

    #[test]
    fn test_ignores_numbers_without_units() {
        assert!(find_numeric_claims("Shot on a 35mm lens in 4K at 24 fps, scene 2.").is_empty());
        assert!(find_numeric_claims("Version v2 secondary 3 secondary").is_empty());
    }

    #[test]
    fn test_decimal_seconds() {
        let claims = find_numeric_claims("each clip 7.14 seconds");
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].value, 7.14);
        assert_eq!(claims[0].span, 10..14);
    }

    #[test]
    fn test_enforce_rewrites_contradictions() {
        let (text, conflicts) = enforce_core_numbers(
            PhaseId::Visuals,
            "Cut it into 9 clips with 150 words over 70 seconds.",
            &decision(),
        );

        assert_eq!(text, "Cut it into 7 clips with 112 words over 50 seconds.");
        assert_eq!(conflicts.len(), 3);
        assert_eq!(conflicts[0].kind, ClaimKind::ClipCount);
        assert_eq!(conflicts[0].stated, 9.0);
        assert_eq!(conflicts[0].enforced, 7.0);
        assert_eq!(conflicts[0].describe(), "Visuals stated 9 clips; using 7");
    }

    #[test]
    fn test_enforce_keeps_consistent_claims() {
        let original = "7 clips, about 100 words, ending at 52s.";
        let (text, conflicts) = enforce_core_numbers(PhaseId::Script, original, &decision());
        assert_eq!(text, original);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_thousands_separator_is_one_number() {
        let claims = find_numeric_claims("Write 1,200 words over 1,000,000 seconds.");
        let found: Vec<(f64, Range<usize>)> =
            claims.iter().map(|c| (c.value, c.span.clone())).collect();
        assert_eq!(found, vec![(1200.0, 6..11), (1_000_000.0, 23..32)]);
    }

    #[test]
    fn test_malformed_grouping_is_not_a_claim() {
        assert!(find_numeric_claims("roughly 1,2000 words").is_empty());
        assert!(find_numeric_claims("takes 3,45 seconds").is_empty());
    }

    #[test]
    fn test_enforce_rewrites_grouped_number_whole() {
        let (text, conflicts) =
            enforce_core_numbers(PhaseId::Script, "Write 1,200 words of narration.", &decision());
        assert_eq!(text, "Write 112 words of narration.");
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].stated, 1200.0);
        assert_eq!(conflicts[0].enforced, 112.0);
    }

    #[test]
    fn test_enforce_handles_non_ascii_text() {
        let (text, conflicts) =
            enforce_core_numbers(PhaseId::Script, "Écrire 200 mots… non, 200 words ✓", &decision());
        assert_eq!(text, "Écrire 200 mots… non, 112 words ✓");
        assert_eq!(conflicts.len(), 1);
    }
}
