//! Weighted consensus evaluation

use super::role::{RoleId, RoleRegistry, RoleWeights};
use super::vote::{Position, Vote};
use crate::core::string::truncate;
use serde::{Deserialize, Serialize};

const SUMMARY_RATIONALE_LEN: usize = 240;

/// Vote counts for one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub agree: usize,
    pub disagree: usize,
    pub neutral: usize,
    /// Neutral positions that were substituted for failed calls
    pub fallback: usize,
}

impl VoteTally {
    pub fn total(&self) -> usize {
        self.agree + self.disagree + self.neutral
    }
}

/// Outcome of evaluating one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub round_index: u32,
    /// Weighted share of agree votes, in `[0, 1]`
    pub agreement_fraction: f64,
    pub decision_text: String,
    pub decided_by: Option<RoleId>,
    /// Set when no role agreed and the text comes from another vote
    pub low_confidence: bool,
    /// Whether the fraction met the phase threshold
    pub terminated: bool,
    pub tally: VoteTally,
}

impl ConsensusResult {
    /// Result for a phase that never completed a round.
    pub fn empty(round_index: u32) -> Self {
        Self {
            round_index,
            agreement_fraction: 0.0,
            decision_text: String::new(),
            decided_by: None,
            low_confidence: true,
            terminated: false,
            tally: VoteTally::default(),
        }
    }

    pub fn agreement_percent(&self) -> u32 {
        (self.agreement_fraction * 100.0).round() as u32
    }
}

/// Scores a round of positions against a threshold.
///
/// Evaluation is pure: the same positions and weights always give the same
/// result regardless of the order positions arrived in.
///
/// # Example
///
/// ```
/// use reel_domain::discussion::{ConsensusEvaluator, Position, RoleWeights, Vote};
///
/// let positions = vec![
///     Position::generated("a", Vote::Agree, "yes", 1),
///     Position::generated("b", Vote::Agree, "yes", 1),
///     Position::generated("c", Vote::Agree, "yes", 1),
///     Position::generated("d", Vote::Disagree, "no", 1),
/// ];
/// let result = ConsensusEvaluator::new(0.7).evaluate(1, &positions, &RoleWeights::new());
/// assert_eq!(result.agreement_fraction, 0.75);
/// assert!(result.terminated);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsensusEvaluator {
    threshold: f64,
}

impl ConsensusEvaluator {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score one round's positions.
    ///
    /// The decision text is the rationale of the heaviest agreeing role. When
    /// nobody agrees, it falls back to the heaviest position of any vote that
    /// has a non-empty rationale, and the result is marked `low_confidence`.
    /// Fallback positions carry no rationale, so they never supply the text;
    /// if no position has one, the decision text is empty. Weight ties go to
    /// the lowest role id.
    pub fn evaluate(
        &self,
        round_index: u32,
        positions: &[Position],
        weights: &RoleWeights,
    ) -> ConsensusResult {
        let mut ordered: Vec<&Position> = positions.iter().collect();
        ordered.sort_by(|a, b| a.role_id.cmp(&b.role_id));

        let mut tally = VoteTally::default();
        let mut agree_weight = 0.0;
        let mut total_weight = 0.0;
        for position in &ordered {
            let weight = weights.weight_of(&position.role_id);
            total_weight += weight;
            match position.vote {
                Vote::Agree => {
                    tally.agree += 1;
                    agree_weight += weight;
                }
                Vote::Disagree => tally.disagree += 1,
                Vote::Neutral => tally.neutral += 1,
            }
            if position.is_fallback() {
                tally.fallback += 1;
            }
        }

        let agreement_fraction = if total_weight > 0.0 {
            (agree_weight / total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let (decision, low_confidence) =
            match heaviest(&ordered, weights, |p| p.vote == Vote::Agree) {
                Some(p) => (Some(p), false),
                None => (heaviest(&ordered, weights, |p| !p.rationale.trim().is_empty()), true),
            };

        ConsensusResult {
            round_index,
            agreement_fraction,
            decision_text: decision.map(|p| p.rationale.trim().to_string()).unwrap_or_default(),
            decided_by: decision.map(|p| p.role_id.clone()),
            low_confidence,
            terminated: !ordered.is_empty() && agreement_fraction >= self.threshold,
            tally,
        }
    }
}

/// Highest-weight matching position; ties go to the lowest role id.
fn heaviest<'a>(
    ordered: &[&'a Position],
    weights: &RoleWeights,
    accept: impl Fn(&Position) -> bool,
) -> Option<&'a Position> {
    let mut best: Option<(&'a Position, f64)> = None;
    for position in ordered.iter().copied().filter(|p| accept(*p)) {
        let weight = weights.weight_of(&position.role_id);
        match best {
            Some((_, best_weight)) if weight <= best_weight => {}
            _ => best = Some((position, weight)),
        }
    }
    best.map(|(p, _)| p)
}

/// Summarize the objections of a round for the next round's prompts.
pub fn summarize_disagreement(
    positions: &[Position],
    result: &ConsensusResult,
    registry: &RoleRegistry,
) -> String {
    let mut ordered: Vec<&Position> = positions.iter().collect();
    ordered.sort_by(|a, b| a.role_id.cmp(&b.role_id));

    let mut lines = vec![format!(
        "Round {} reached {}% agreement.",
        result.round_index,
        result.agreement_percent()
    )];

    if !result.decision_text.is_empty() {
        lines.push(format!(
            "Leading proposal: {}",
            truncate(&result.decision_text, SUMMARY_RATIONALE_LEN)
        ));
    }

    let objections: Vec<String> = ordered
        .iter()
        .filter(|p| p.vote != Vote::Agree)
        .map(|p| {
            let name = registry.display_name(&p.role_id);
            if p.is_fallback() {
                format!("- {name}: no response")
            } else if p.rationale.trim().is_empty() {
                format!("- {name} ({})", p.vote)
            } else {
                format!(
                    "- {name} ({}): {}",
                    p.vote,
                    truncate(p.rationale.trim(), SUMMARY_RATIONALE_LEN)
                )
            }
        })
        .collect();

    if objections.is_empty() {
        lines.push("No objections were raised.".to_string());
    } else {
        lines.push("Open points:".to_string());
        lines.extend(objections);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discussion::role::Role;

    fn agree(role: &str, text: &str) -> Position {
        Position::generated(role, Vote::Agree, text, 1)
    }

    fn disagree(role: &str, text: &str) -> Position {
        Position::generated(role, Vote::Disagree, text, 1)
    }

    #[test]
    fn test_three_of_four_agree() {
        let positions = vec![
            agree("a", "A"),
            agree("b", "B"),
            agree("c", "C"),
            disagree("d", "D"),
        ];
        let result = ConsensusEvaluator::new(0.7).evaluate(1, &positions, &RoleWeights::new());

        assert_eq!(result.agreement_fraction, 0.75);
        assert!(result.terminated);
        assert!(!result.low_confidence);
        assert_eq!(result.decision_text, "A");
        assert_eq!(result.tally.agree, 3);
        assert_eq!(result.tally.disagree, 1);
    }

    #[test]
    fn test_all_fallback_scores_zero() {
        let positions = vec![
            Position::fallback("a", 1, "down"),
            Position::fallback("b", 1, "down"),
        ];
        let result = ConsensusEvaluator::new(0.5).evaluate(1, &positions, &RoleWeights::new());

        assert_eq!(result.agreement_fraction, 0.0);
        assert!(!result.terminated);
        assert!(result.low_confidence);
        assert_eq!(result.decision_text, "");
        assert_eq!(result.tally.fallback, 2);
    }

    #[test]
    fn test_empty_round_never_terminates() {
        let result = ConsensusEvaluator::new(0.0).evaluate(1, &[], &RoleWeights::new());
        assert_eq!(result.agreement_fraction, 0.0);
        assert!(!result.terminated);
    }

    #[test]
    fn test_weighted_agreement() {
        let positions = vec![agree("director", "Go bold"), disagree("editor", "Too long")];
        let weights = RoleWeights::new().with("director", 3.0);
        let result = ConsensusEvaluator::new(0.75).evaluate(1, &positions, &weights);

        assert_eq!(result.agreement_fraction, 0.75);
        assert!(result.terminated);
    }

    #[test]
    fn test_decision_prefers_heaviest_agree_then_lowest_id() {
        let positions = vec![agree("zeta", "Z"), agree("beta", "B"), agree("alpha", "A")];
        let weights = RoleWeights::new().with("zeta", 2.0);
        let result = ConsensusEvaluator::new(0.5).evaluate(1, &positions, &weights);
        assert_eq!(result.decision_text, "Z");

        let result = ConsensusEvaluator::new(0.5).evaluate(1, &positions, &RoleWeights::new());
        assert_eq!(result.decision_text, "A");
        assert_eq!(result.decided_by, Some(RoleId::from("alpha")));
    }

    #[test]
    fn test_no_agree_is_low_confidence() {
        let positions = vec![
            disagree("b", "Needs a stronger hook"),
            Position::generated("a", Vote::Neutral, "", 1),
        ];
        let result = ConsensusEvaluator::new(0.5).evaluate(1, &positions, &RoleWeights::new());

        assert!(result.low_confidence);
        assert_eq!(result.decision_text, "Needs a stronger hook");
    }

    #[test]
    fn test_no_agree_skips_empty_rationales_even_when_heavier() {
        let weights = RoleWeights::new().with("a", 3.0);
        let positions = vec![
            Position::fallback("a", 1, "timeout"),
            disagree("b", "Cut the intro"),
        ];
        let result = ConsensusEvaluator::new(0.5).evaluate(1, &positions, &weights);

        assert!(result.low_confidence);
        assert_eq!(result.decided_by, Some(RoleId::from("b")));
        assert_eq!(result.decision_text, "Cut the intro");
    }

    #[test]
    fn test_order_independent() {
        let forward = vec![agree("a", "A"), disagree("b", "B"), agree("c", "C")];
        let mut reversed = forward.clone();
        reversed.reverse();

        let evaluator = ConsensusEvaluator::new(0.6);
        let weights = RoleWeights::new().with("b", 0.5);
        assert_eq!(
            evaluator.evaluate(1, &forward, &weights),
            evaluator.evaluate(1, &reversed, &weights)
        );
    }

    #[test]
    fn test_disagreement_summary() {
        let registry = RoleRegistry::from_roles(vec![
            Role::new("a", "Alpha"),
            Role::new("b", "Bravo"),
            Role::new("c", "Charlie"),
        ]);
        let positions = vec![
            agree("a", "Open on the reef"),
            disagree("b", "The reef shot is too dark"),
            Position::fallback("c", 1, "timeout"),
        ];
        let result = ConsensusEvaluator::new(0.9).evaluate(1, &positions, &registry.weights());
        let summary = summarize_disagreement(&positions, &result, &registry);

        assert!(summary.starts_with("Round 1 reached 33% agreement."));
        assert!(summary.contains("Leading proposal: Open on the reef"));
        assert!(summary.contains("- Bravo (disagree): The reef shot is too dark"));
        assert!(summary.contains("- Charlie: no response"));
        assert!(!summary.contains("Alpha"));
    }
}
