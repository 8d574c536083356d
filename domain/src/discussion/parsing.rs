//! Reply parsing for role positions.
//!
//! Roles are asked to answer with a `VOTE:` line and a `RATIONALE:` section,
//! but replies are free-form text and often ignore the format. Parsing is
//! tolerant: an explicit vote line wins, otherwise keywords are scanned, and
//! anything unclear is neutral.

use super::vote::Vote;

const VOTE_MARKER: &str = "VOTE";
const RATIONALE_MARKER: &str = "RATIONALE:";

/// Phrases that flip an agreement into a disagreement.
const NEGATIVE_PHRASES: &[&str] = &[
    "DISAGREE",
    "NOT AGREE",
    "DON'T AGREE",
    "DO NOT AGREE",
    "CANNOT AGREE",
    "CAN'T AGREE",
    "NOT APPROVE",
    "CANNOT APPROVE",
    "REJECT",
    "I OBJECT",
];

const POSITIVE_PHRASES: &[&str] = &["AGREE", "APPROVE", "SUPPORT THIS"];

/// Extract the vote from a reply.
pub fn parse_vote(reply: &str) -> Vote {
    let upper = reply.to_ascii_uppercase();

    for line in upper.lines() {
        if let Some(rest) = vote_line_value(line)
            && let Some(vote) = vote_keyword(rest)
        {
            return vote;
        }
    }

    if NEGATIVE_PHRASES.iter().any(|p| upper.contains(p)) {
        Vote::Disagree
    } else if POSITIVE_PHRASES.iter().any(|p| upper.contains(p)) {
        Vote::Agree
    } else {
        Vote::Neutral
    }
}

/// Value part of a `VOTE:` line, or `None` for any other line.
fn vote_line_value(upper_line: &str) -> Option<&str> {
    let line = upper_line.trim().trim_start_matches(['*', '#', '-', '>', ' ']);
    let rest = line.strip_prefix(VOTE_MARKER)?;
    if rest.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(rest.trim_start_matches([':', '=', '*', ' ']))
}

fn vote_keyword(text: &str) -> Option<Vote> {
    let word: String = text.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    match word.as_str() {
        "DISAGREE" | "REJECT" => Some(Vote::Disagree),
        "AGREE" | "APPROVE" => Some(Vote::Agree),
        "NEUTRAL" | "ABSTAIN" => Some(Vote::Neutral),
        _ => None,
    }
}

/// Extract `(vote, rationale)` from a reply.
///
/// The rationale is the text after `RATIONALE:` when present, otherwise the
/// whole reply minus its vote line.
pub fn parse_position_reply(reply: &str) -> (Vote, String) {
    let vote = parse_vote(reply);

    // ASCII uppercasing keeps byte offsets aligned with the original text.
    let upper = reply.to_ascii_uppercase();
    if let Some(idx) = upper.find(RATIONALE_MARKER) {
        let rationale = reply[idx + RATIONALE_MARKER.len()..].trim();
        return (vote, rationale.to_string());
    }

    let rationale = reply
        .lines()
        .filter(|line| vote_line_value(&line.to_ascii_uppercase()).is_none())
        .collect::<Vec<_>>()
        .join("\n");

    (vote, rationale.trim().to_string())
}
