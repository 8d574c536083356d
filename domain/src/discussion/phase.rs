//! Discussion phases and topic templates

use super::role::RoleId;
use crate::core::error::DomainError;
use crate::production::CoreDecision;
use crate::production::decision::format_seconds;
use serde::{Deserialize, Serialize};

/// Identifier of a discussion phase, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseId {
    Concept,
    Script,
    Audio,
    Visuals,
    Assembly,
}

impl PhaseId {
    pub const ALL: [PhaseId; 5] = [
        PhaseId::Concept,
        PhaseId::Script,
        PhaseId::Audio,
        PhaseId::Visuals,
        PhaseId::Assembly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseId::Concept => "concept",
            PhaseId::Script => "script",
            PhaseId::Audio => "audio",
            PhaseId::Visuals => "visuals",
            PhaseId::Assembly => "assembly",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PhaseId::Concept => "Concept",
            PhaseId::Script => "Script",
            PhaseId::Audio => "Audio",
            PhaseId::Visuals => "Visuals",
            PhaseId::Assembly => "Assembly",
        }
    }

    /// Built-in topic template for this phase.
    pub fn default_topic_template(&self) -> &'static str {
        match self {
            PhaseId::Concept => {
                "Propose the creative angle for a {duration}s {platform} video about: {brief}\n\
                 Settle the opening hook, the tone, and the single takeaway the viewer should leave with."
            }
            PhaseId::Script => {
                "Decide the narration approach for a {duration}s video about: {brief}\n\
                 The narration is written in {language}, must fit in {word_budget} words, \
                 and is spread across {clip_count} clips.\n{previous_decisions}"
            }
            PhaseId::Audio => {
                "Decide the narration delivery and soundtrack for the video about: {brief}\n\
                 The voice is {voice}; the narration runs for about {duration}s.\n{previous_decisions}"
            }
            PhaseId::Visuals => {
                "Decide the visual style for {clip_count} clips of at most {per_clip}s each \
                 for the video about: {brief}\n\
                 Cover framing, color, motion and what each clip shows.\n{previous_decisions}"
            }
            PhaseId::Assembly => {
                "Decide pacing, transitions and on-screen text for the final {duration}s {platform} cut \
                 of the video about: {brief}\n{previous_decisions}"
            }
        }
    }
}

impl std::fmt::Display for PhaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for PhaseId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concept" => Ok(PhaseId::Concept),
            "script" => Ok(PhaseId::Script),
            "audio" => Ok(PhaseId::Audio),
            "visuals" | "visual" => Ok(PhaseId::Visuals),
            "assembly" => Ok(PhaseId::Assembly),
            other => Err(DomainError::UnknownPhase(other.to_string())),
        }
    }
}

/// One discussion stage, read-only for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Phase {
    id: PhaseId,
    topic_template: String,
    max_rounds: u32,
    consensus_threshold: f64,
    participating_roles: Vec<RoleId>,
}

impl Phase {
    /// Create a phase with the built-in topic template.
    ///
    /// `max_rounds` is at least 1 and the threshold is clamped to `[0, 1]`.
    /// Roles are kept sorted by id.
    pub fn new(
        id: PhaseId,
        max_rounds: u32,
        consensus_threshold: f64,
        mut participating_roles: Vec<RoleId>,
    ) -> Self {
        participating_roles.sort();
        participating_roles.dedup();
        Self {
            id,
            topic_template: id.default_topic_template().to_string(),
            max_rounds: max_rounds.max(1),
            consensus_threshold: consensus_threshold.clamp(0.0, 1.0),
            participating_roles,
        }
    }

    pub fn with_topic_template(mut self, template: impl Into<String>) -> Self {
        self.topic_template = template.into();
        self
    }

    pub fn id(&self) -> PhaseId {
        self.id
    }

    pub fn topic_template(&self) -> &str {
        &self.topic_template
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn consensus_threshold(&self) -> f64 {
        self.consensus_threshold
    }

    pub fn participating_roles(&self) -> &[RoleId] {
        &self.participating_roles
    }

    /// Fill the topic template from the run's context.
    pub fn render_topic(&self, context: &TopicContext<'_>) -> String {
        let decision = context.decision;
        self.topic_template
            .replace("{brief}", context.brief)
            .replace("{duration}", &format_seconds(decision.total_duration()))
            .replace("{clip_count}", &decision.clip_count().to_string())
            .replace("{per_clip}", &format_seconds(decision.per_clip_duration_bound()))
            .replace("{word_budget}", &decision.word_budget().to_string())
            .replace("{language}", decision.language().as_str())
            .replace("{platform}", decision.platform().display_name())
            .replace("{voice}", decision.voice())
            .replace("{previous_decisions}", &context.render_previous_decisions())
            .trim_end()
            .to_string()
    }
}

/// Inputs available to a topic template.
#[derive(Debug, Clone, Copy)]
pub struct TopicContext<'a> {
    pub brief: &'a str,
    pub decision: &'a CoreDecision,
    /// Final decision text of every earlier phase, in order
    pub previous_decisions: &'a [(PhaseId, String)],
}

impl<'a> TopicContext<'a> {
    pub fn new(
        brief: &'a str,
        decision: &'a CoreDecision,
        previous_decisions: &'a [(PhaseId, String)],
    ) -> Self {
        Self {
            brief,
            decision,
            previous_decisions,
        }
    }

    fn render_previous_decisions(&self) -> String {
        let lines: Vec<String> = self
            .previous_decisions
            .iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(phase, text)| format!("- {}: {}", phase.display_name(), text.trim()))
            .collect();

        if lines.is_empty() {
            String::new()
        } else {
            format!("Decisions already made:\n{}", lines.join("\n"))
        }
    }
}
