//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The requested total duration is zero, negative or not a finite number.
    ///
    /// This is the only input error of the Decision Framework; it is raised
    /// before any external service is contacted.
    #[error("Invalid duration: {0} (must be a positive number of seconds)")]
    InvalidDuration(f64),

    /// The duration is valid but its clip count or word budget does not fit
    /// the decision's integer fields.
    #[error("Duration too long: {duration}s (at most {max}s with the current parameters)")]
    DurationTooLong { duration: f64, max: f64 },

    #[error("Invalid decision parameters: {0}")]
    InvalidParameters(String),

    #[error("Unknown discussion mode: {0} (valid: off, light, standard, deep)")]
    UnknownDiscussionMode(String),

    #[error("Unknown phase: {0}")]
    UnknownPhase(String),
}

impl DomainError {
    /// Check if this error was caused by bad caller input
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidDuration(_)
                | DomainError::DurationTooLong { .. }
                | DomainError::UnknownDiscussionMode(_)
                | DomainError::UnknownPhase(_)
        )
    }
}
