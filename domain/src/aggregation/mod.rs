//! Merging phase outcomes into the final configuration

pub mod claims;
pub mod final_config;

pub use claims::{AggregationConflict, ClaimKind, NumericClaim, enforce_core_numbers, find_numeric_claims};
pub use final_config::{Aggregation, DecisionAggregator, FinalConfiguration, PhaseDecision};
