//! Production roles and the role registry

use super::phase::PhaseId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stable role identifier, e.g. `"creative_director"`.
///
/// Ordering is lexicographic; every place that needs a deterministic role
/// order (prompt fan-out results, tie-breaks) sorts by this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A production role that takes part in the discussion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Role {
    pub id: RoleId,
    pub display_name: String,
    /// Free-form capability tags ("narrative", "pacing", ...)
    pub capabilities: Vec<String>,
    /// Phases this role takes part in
    pub phase_membership: Vec<PhaseId>,
    /// Consensus weight, 1.0 unless configured otherwise
    pub weight: f64,
    /// Persona text placed in the role's system prompt
    pub persona: String,
    /// Core roles are the only ones consulted in the light preset
    pub core: bool,
}

impl Role {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: RoleId::new(id),
            display_name: display_name.into(),
            capabilities: Vec::new(),
            phase_membership: Vec::new(),
            weight: 1.0,
            persona: String::new(),
            core: false,
        }
    }

    pub fn with_phases(mut self, phases: &[PhaseId]) -> Self {
        self.phase_membership = phases.to_vec();
        self
    }

    pub fn with_capabilities(mut self, capabilities: &[&str]) -> Self {
        self.capabilities = capabilities.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Negative or non-finite weights are treated as zero.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = sanitize_weight(weight);
        self
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn core(mut self) -> Self {
        self.core = true;
        self
    }

    pub fn participates_in(&self, phase: PhaseId) -> bool {
        self.phase_membership.contains(&phase)
    }
}

fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Consensus weight lookup. Roles without an entry weigh 1.0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleWeights(HashMap<RoleId, f64>);

impl RoleWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, role: impl Into<RoleId>, weight: f64) -> Self {
        self.0.insert(role.into(), sanitize_weight(weight));
        self
    }

    pub fn weight_of(&self, role: &RoleId) -> f64 {
        self.0.get(role).copied().unwrap_or(1.0)
    }
}

impl From<String> for RoleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

struct BuiltinRole {
    id: &'static str,
    display_name: &'static str,
    capabilities: &'static [&'static str],
    phases: &'static [PhaseId],
    weight: f64,
    core: bool,
    persona: &'static str,
}

const BUILTIN_ROLES: &[BuiltinRole] = &[
    BuiltinRole {
        id: "cinematographer",
        display_name: "Cinematographer",
        capabilities: &["framing", "lighting", "camera-motion"],
        phases: &[PhaseId::Visuals, PhaseId::Assembly],
        weight: 1.0,
        core: true,
        persona: "You are the cinematographer. You think in shots: framing, lighting, \
                  camera movement and how each clip reads on a vertical phone screen.",
    },
    BuiltinRole {
        id: "continuity_checker",
        display_name: "Continuity Checker",
        capabilities: &["consistency", "timing", "fact-check"],
        phases: &[PhaseId::Script, PhaseId::Visuals, PhaseId::Assembly],
        weight: 1.0,
        core: false,
        persona: "You are the continuity checker. You make sure every proposal respects the \
                  fixed numbers of the production and that script, audio and visuals stay consistent.",
    },
    BuiltinRole {
        id: "creative_director",
        display_name: "Creative Director",
        capabilities: &["story", "tone", "brand"],
        phases: &[
            PhaseId::Concept,
            PhaseId::Script,
            PhaseId::Audio,
            PhaseId::Visuals,
            PhaseId::Assembly,
        ],
        weight: 1.5,
        core: true,
        persona: "You are the creative director. You own the overall vision, keep the video \
                  focused on one idea and decide when a proposal is good enough to ship.",
    },
    BuiltinRole {
        id: "editor",
        display_name: "Editor",
        capabilities: &["pacing", "cuts", "rhythm"],
        phases: &[PhaseId::Script, PhaseId::Visuals, PhaseId::Assembly],
        weight: 1.0,
        core: false,
        persona: "You are the editor. You care about pacing, cut points and keeping the \
                  viewer watching until the last second.",
    },
    BuiltinRole {
        id: "platform_strategist",
        display_name: "Platform Strategist",
        capabilities: &["audience", "hooks", "platform-norms"],
        phases: &[PhaseId::Concept, PhaseId::Script, PhaseId::Assembly],
        weight: 1.0,
        core: false,
        persona: "You are the platform strategist. You know what makes short-form videos \
                  perform: strong hooks in the first seconds, clear captions and native pacing.",
    },
    BuiltinRole {
        id: "scriptwriter",
        display_name: "Scriptwriter",
        capabilities: &["narrative", "narration", "wording"],
        phases: &[PhaseId::Concept, PhaseId::Script],
        weight: 1.0,
        core: true,
        persona: "You are the scriptwriter. You write tight spoken narration that fits the \
                  word budget and sounds natural when read aloud.",
    },
    BuiltinRole {
        id: "sound_designer",
        display_name: "Sound Designer",
        capabilities: &["music", "sound-effects", "mixing"],
        phases: &[PhaseId::Audio, PhaseId::Assembly],
        weight: 1.0,
        core: false,
        persona: "You are the sound designer. You choose music and sound effects that support \
                  the narration without drowning it.",
    },
    BuiltinRole {
        id: "voice_director",
        display_name: "Voice Director",
        capabilities: &["delivery", "voice-casting", "pronunciation"],
        phases: &[PhaseId::Script, PhaseId::Audio],
        weight: 1.0,
        core: true,
        persona: "You are the voice director. You decide how the narration is delivered: \
                  voice, pace, emphasis and pronunciation.",
    },
];

/// Registry of roles, kept sorted by id.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleRegistry {
    roles: Vec<Role>,
}

impl RoleRegistry {
    /// The eight built-in production roles.
    pub fn builtin() -> Self {
        let roles = BUILTIN_ROLES
            .iter()
            .map(|spec| {
                let role = Role::new(spec.id, spec.display_name)
                    .with_capabilities(spec.capabilities)
                    .with_phases(spec.phases)
                    .with_weight(spec.weight)
                    .with_persona(spec.persona);
                if spec.core { role.core() } else { role }
            })
            .collect();
        Self::from_roles(roles)
    }

    /// Build a registry from explicit roles. Later duplicates of an id are dropped.
    pub fn from_roles(mut roles: Vec<Role>) -> Self {
        roles.sort_by(|a, b| a.id.cmp(&b.id));
        roles.dedup_by(|later, earlier| later.id == earlier.id);
        Self { roles }
    }

    /// Apply configured weight overrides.
    ///
    /// Returns the registry plus the override keys that matched no role.
    pub fn with_weight_overrides(mut self, overrides: &HashMap<String, f64>) -> (Self, Vec<String>) {
        let mut unknown = Vec::new();
        for (id, weight) in overrides {
            match self.roles.iter_mut().find(|r| r.id.as_str() == id) {
                Some(role) => role.weight = sanitize_weight(*weight),
                None => unknown.push(id.clone()),
            }
        }
        unknown.sort();
        (self, unknown)
    }

    pub fn get(&self, id: &RoleId) -> Option<&Role> {
        self.roles.iter().find(|r| &r.id == id)
    }

    pub fn display_name(&self, id: &RoleId) -> String {
        self.get(id)
            .map(|r| r.display_name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Roles taking part in `phase`, sorted by id.
    pub fn members_of(&self, phase: PhaseId) -> Vec<&Role> {
        self.roles.iter().filter(|r| r.participates_in(phase)).collect()
    }

    pub fn core_members_of(&self, phase: PhaseId) -> Vec<&Role> {
        self.roles
            .iter()
            .filter(|r| r.core && r.participates_in(phase))
            .collect()
    }

    pub fn weights(&self) -> RoleWeights {
        RoleWeights(self.roles.iter().map(|r| (r.id.clone(), r.weight)).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
