//! Phase state machine

use super::consensus::ConsensusResult;
use super::phase::{Phase, PhaseId};
use super::vote::Position;
use serde::{Deserialize, Serialize};

/// Lifecycle of a phase within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    Pending,
    RoundRunning { round: u32 },
    BetweenRounds { completed: u32 },
    ConsensusReached { round: u32 },
    RoundsExhausted,
    Interrupted,
}

impl PhaseState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PhaseState::ConsensusReached { .. } | PhaseState::RoundsExhausted | PhaseState::Interrupted
        )
    }
}

/// How a phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseTermination {
    ConsensusReached,
    RoundsExhausted,
    Interrupted,
    Skipped,
}

impl PhaseTermination {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseTermination::ConsensusReached => "consensus reached",
            PhaseTermination::RoundsExhausted => "rounds exhausted",
            PhaseTermination::Interrupted => "interrupted",
            PhaseTermination::Skipped => "skipped",
        }
    }
}

/// Positions and consensus of one completed (or partial) round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_index: u32,
    /// Sorted by role id
    pub positions: Vec<Position>,
    pub result: ConsensusResult,
}

/// Final record of a phase, consumed by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseOutcome {
    pub phase: PhaseId,
    pub rounds: Vec<RoundRecord>,
    pub final_result: ConsensusResult,
    pub termination: PhaseTermination,
}

impl PhaseOutcome {
    pub fn skipped(phase: PhaseId) -> Self {
        Self {
            phase,
            rounds: Vec::new(),
            final_result: ConsensusResult::empty(0),
            termination: PhaseTermination::Skipped,
        }
    }

    /// Anything short of reaching consensus degrades the run.
    pub fn is_degraded(&self) -> bool {
        self.termination != PhaseTermination::ConsensusReached
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.rounds.iter().flat_map(|r| r.positions.iter())
    }
}

/// Drives one phase through its rounds.
///
/// The caller asks for the next round with [`begin_round`](Self::begin_round),
/// collects positions, and hands the evaluated round back with
/// [`record_round`](Self::record_round). [`finish`](Self::finish) then picks
/// the phase's final result: the terminating round on consensus, otherwise the
/// round with the highest agreement (earliest wins a tie).
#[derive(Debug, Clone)]
pub struct PhaseProgress {
    phase: Phase,
    state: PhaseState,
    rounds: Vec<RoundRecord>,
}

impl PhaseProgress {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            state: PhaseState::Pending,
            rounds: Vec::new(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn state(&self) -> PhaseState {
        self.state
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn last_round(&self) -> Option<&RoundRecord> {
        self.rounds.last()
    }

    /// Start the next round, returning its 1-based index.
    pub fn begin_round(&mut self) -> Option<u32> {
        let round = match self.state {
            PhaseState::Pending => 1,
            PhaseState::BetweenRounds { completed } => completed + 1,
            _ => return None,
        };
        self.state = PhaseState::RoundRunning { round };
        Some(round)
    }

    /// Record the running round. Returns `false` if no round was running.
    pub fn record_round(&mut self, record: RoundRecord) -> bool {
        let PhaseState::RoundRunning { round } = self.state else {
            return false;
        };

        let terminated = record.result.terminated;
        self.rounds.push(record);
        self.state = if terminated {
            PhaseState::ConsensusReached { round }
        } else if round >= self.phase.max_rounds() {
            PhaseState::RoundsExhausted
        } else {
            PhaseState::BetweenRounds { completed: round }
        };
        true
    }

    /// Stop the phase early, keeping whatever positions of the running round arrived.
    pub fn interrupt(&mut self, partial: Option<RoundRecord>) {
        if self.state.is_terminal() {
            return;
        }
        if let (PhaseState::RoundRunning { .. }, Some(record)) = (self.state, partial)
            && !record.positions.is_empty()
        {
            self.rounds.push(record);
        }
        self.state = PhaseState::Interrupted;
    }

    pub fn finish(self) -> PhaseOutcome {
        let termination = match self.state {
            PhaseState::ConsensusReached { .. } => PhaseTermination::ConsensusReached,
            PhaseState::RoundsExhausted => PhaseTermination::RoundsExhausted,
            PhaseState::Pending if self.rounds.is_empty() => PhaseTermination::Skipped,
            _ => PhaseTermination::Interrupted,
        };

        let final_result = match termination {
            PhaseTermination::ConsensusReached => self.rounds.last().map(|r| r.result.clone()),
            _ => best_round(&self.rounds).map(|r| r.result.clone()),
        }
        .unwrap_or_else(|| ConsensusResult::empty(0));

        PhaseOutcome {
            phase: self.phase.id(),
            rounds: self.rounds,
            final_result,
            termination,
        }
    }
}

fn best_round(rounds: &[RoundRecord]) -> Option<&RoundRecord> {
    let mut best: Option<&RoundRecord> = None;
    for round in rounds {
        match best {
            Some(b) if round.result.agreement_fraction <= b.result.agreement_fraction => {}
            _ => best = Some(round),
        }
    }
    best
}
