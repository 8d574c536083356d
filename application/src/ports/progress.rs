//! Progress notification port
//!
//! Defines the interface for reporting progress during a discussion.

use reel_domain::{ConsensusResult, Phase, PhaseOutcome, Position};

/// Callback for progress updates during a discussion
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain log lines, ...).
pub trait DiscussionProgress: Send + Sync {
    /// Called once before the first phase
    fn on_discussion_start(&self, _phase_count: usize) {}

    /// Called when a phase starts
    fn on_phase_start(&self, phase: &Phase);

    /// Called when a round starts within a phase
    fn on_round_start(&self, _phase: &Phase, _round_index: u32, _role_count: usize) {}

    /// Called for every position as it arrives
    fn on_position(&self, phase: &Phase, position: &Position);

    /// Called after a round has been evaluated
    fn on_round_complete(&self, _phase: &Phase, _result: &ConsensusResult) {}

    /// Called when a phase completes (including skipped phases)
    fn on_phase_complete(&self, outcome: &PhaseOutcome);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl DiscussionProgress for NoProgress {
    fn on_phase_start(&self, _phase: &Phase) {}
    fn on_position(&self, _phase: &Phase, _position: &Position) {}
    fn on_phase_complete(&self, _outcome: &PhaseOutcome) {}
}
