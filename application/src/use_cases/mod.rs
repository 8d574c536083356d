//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod generate_position;
pub mod resolve_production;
pub mod run_discussion;
pub(crate) mod shared;

#[cfg(test)]
mod testing;
