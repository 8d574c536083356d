//! Prompt templates for role positions

use crate::discussion::{Phase, Role};

/// Templates for the prompts sent to each role
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for a role: persona plus the reply contract.
    pub fn position_system(role: &Role) -> String {
        let persona = if role.persona.trim().is_empty() {
            format!("You are the {} of a short-form video production team.", role.display_name)
        } else {
            role.persona.trim().to_string()
        };

        format!(
            r#"{persona}
You are taking part in a production meeting with the other roles of the team.
The numeric constraints you are given are fixed and must not be changed.

Reply in exactly this format:
VOTE: AGREE | DISAGREE | NEUTRAL
RATIONALE: <your concrete proposal or objection, at most a few sentences>

Vote AGREE when you can commit to the proposal you describe, DISAGREE when the
current direction has a problem you can name, NEUTRAL when it is outside your craft."#
        )
    }

    /// User prompt for one round of a phase.
    pub fn position_prompt(
        phase: &Phase,
        topic: &str,
        constraints: &[String],
        round_index: u32,
        previous_round_summary: Option<&str>,
    ) -> String {
        let mut prompt = format!(
            "Phase: {} (round {} of {})\n\n{}\n",
            phase.id().display_name(),
            round_index,
            phase.max_rounds(),
            topic.trim()
        );

        if !constraints.is_empty() {
            prompt.push_str("\nFixed constraints:\n");
            for line in constraints {
                prompt.push_str(&format!("- {line}\n"));
            }
        }

        if let Some(summary) = previous_round_summary.filter(|s| !s.trim().is_empty()) {
            prompt.push_str(&format!(
                "\nThe previous round did not reach agreement.\n{}\n\
                 Address the open points and state your position again.\n",
                summary.trim()
            ));
        }

        prompt
    }
}
