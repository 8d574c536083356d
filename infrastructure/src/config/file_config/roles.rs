//! Role configuration from TOML (`[roles]` section)
//!
//! ```toml
//! [roles.weights]
//! creative_director = 2.0
//! continuity_checker = 0.5
//! ```

use reel_domain::{ConfigIssue, ConfigIssueCode, RoleRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRolesConfig {
    /// Consensus weight overrides keyed by role id
    pub weights: HashMap<String, f64>,
}

impl FileRolesConfig {
    /// Build the built-in registry with the configured weights applied.
    pub fn to_registry(&self) -> (RoleRegistry, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        let mut invalid: Vec<(&String, &f64)> = self
            .weights
            .iter()
            .filter(|(_, w)| !(w.is_finite() && **w >= 0.0))
            .collect();
        invalid.sort_by(|a, b| a.0.cmp(b.0));
        for (role, weight) in invalid {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: format!("roles.weights.{role}"),
                },
                format!("roles.weights.{role}: weight must be zero or positive, got {weight}"),
            ));
        }

        let (registry, unknown) = RoleRegistry::builtin().with_weight_overrides(&self.weights);
        for role in unknown {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::UnknownRole { role: role.clone() },
                format!("roles.weights: no role named '{role}', ignoring its weight"),
            ));
        }

        (registry, issues)
    }
}
