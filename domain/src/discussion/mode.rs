//! Discussion presets

use super::phase::{Phase, PhaseId};
use super::role::{Role, RoleRegistry};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// How much deliberation a run gets.
///
/// | Mode       | Phases                                   | Rounds | Threshold | Roles        |
/// |------------|------------------------------------------|--------|-----------|--------------|
/// | `off`      | none                                     | -      | -         | -            |
/// | `light`    | script, visuals                          | 1      | 0.50      | core only    |
/// | `standard` | script, audio, visuals                   | 2      | 0.66      | all members  |
/// | `deep`     | concept, script, audio, visuals, assembly| 3      | 0.75      | all members  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscussionMode {
    Off,
    Light,
    #[default]
    Standard,
    Deep,
}

impl DiscussionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscussionMode::Off => "off",
            DiscussionMode::Light => "light",
            DiscussionMode::Standard => "standard",
            DiscussionMode::Deep => "deep",
        }
    }

    pub fn phase_ids(&self) -> &'static [PhaseId] {
        match self {
            DiscussionMode::Off => &[],
            DiscussionMode::Light => &[PhaseId::Script, PhaseId::Visuals],
            DiscussionMode::Standard => &[PhaseId::Script, PhaseId::Audio, PhaseId::Visuals],
            DiscussionMode::Deep => &PhaseId::ALL,
        }
    }

    pub fn max_rounds(&self) -> u32 {
        match self {
            DiscussionMode::Off => 0,
            DiscussionMode::Light => 1,
            DiscussionMode::Standard => 2,
            DiscussionMode::Deep => 3,
        }
    }

    pub fn consensus_threshold(&self) -> f64 {
        match self {
            DiscussionMode::Off => 1.0,
            DiscussionMode::Light => 0.5,
            DiscussionMode::Standard => 0.66,
            DiscussionMode::Deep => 0.75,
        }
    }

    fn core_only(&self) -> bool {
        matches!(self, DiscussionMode::Light)
    }

    /// Build the phase list for this preset.
    ///
    /// Phases that end up with no participating role are left out.
    pub fn phases(&self, registry: &RoleRegistry) -> Vec<Phase> {
        self.phase_ids()
            .iter()
            .filter_map(|&id| {
                let members: Vec<&Role> = if self.core_only() {
                    registry.core_members_of(id)
                } else {
                    registry.members_of(id)
                };
                if members.is_empty() {
                    return None;
                }
                let roles = members.into_iter().map(|r| r.id.clone()).collect();
                Some(Phase::new(
                    id,
                    self.max_rounds(),
                    self.consensus_threshold(),
                    roles,
                ))
            })
            .collect()
    }
}

impl std::fmt::Display for DiscussionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DiscussionMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" | "none" => Ok(DiscussionMode::Off),
            "light" => Ok(DiscussionMode::Light),
            "standard" => Ok(DiscussionMode::Standard),
            "deep" => Ok(DiscussionMode::Deep),
            other => Err(DomainError::UnknownDiscussionMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("Deep".parse::<DiscussionMode>().unwrap(), DiscussionMode::Deep);
        assert_eq!("none".parse::<DiscussionMode>().unwrap(), DiscussionMode::Off);
        assert!(matches!(
            "exhaustive".parse::<DiscussionMode>(),
            Err(DomainError::UnknownDiscussionMode(_))
        ));
    }

    #[test]
    fn test_off_has_no_phases() {
        assert!(DiscussionMode::Off.phases(&RoleRegistry::builtin()).is_empty());
    }

    #[test]
    fn test_light_uses_core_roles() {
        let phases = DiscussionMode::Light.phases(&RoleRegistry::builtin());
        let ids: Vec<PhaseId> = phases.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![PhaseId::Script, PhaseId::Visuals]);

        let script = &phases[0];
        assert_eq!(script.max_rounds(), 1);
        assert_eq!(script.consensus_threshold(), 0.5);
        let roles: Vec<&str> = script.participating_roles().iter().map(|r| r.as_str()).collect();
        assert_eq!(roles, vec!["creative_director", "scriptwriter", "voice_director"]);
    }

    #[test]
    fn test_deep_covers_all_phases() {
        let phases = DiscussionMode::Deep.phases(&RoleRegistry::builtin());
        assert_eq!(phases.len(), 5);
        assert!(phases.iter().all(|p| p.max_rounds() == 3));
    }

    #[test]
    fn test_phase_without_members_is_skipped() {
        let registry = RoleRegistry::from_roles(vec![
            Role::new("writer", "Writer").with_phases(&[PhaseId::Script]),
        ]);
        let phases = DiscussionMode::Standard.phases(&registry);
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].id(), PhaseId::Script);
    }
}
