//! Progress reporting for discussion execution

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use reel_application::ports::progress::DiscussionProgress;
use reel_domain::{ConsensusResult, Phase, PhaseOutcome, PhaseTermination, Position};
use std::sync::Mutex;

/// Reports progress during a discussion with one progress bar per phase
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.phase_bar.lock()
            && let Some(pb) = guard.as_ref()
        {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn vote_mark(position: &Position) -> String {
    let symbol = position.vote.symbol().to_string();
    let symbol = symbol.as_str();
    if position.is_fallback() {
        symbol.dimmed().to_string()
    } else {
        match position.vote {
            reel_domain::Vote::Agree => symbol.green().to_string(),
            reel_domain::Vote::Disagree => symbol.red().to_string(),
            reel_domain::Vote::Neutral => symbol.yellow().to_string(),
        }
    }
}

fn termination_label(outcome: &PhaseOutcome) -> String {
    let percent = outcome.final_result.agreement_percent();
    match outcome.termination {
        PhaseTermination::ConsensusReached => format!("{} ({percent}%)", "agreed".green()),
        PhaseTermination::RoundsExhausted => format!("{} ({percent}%)", "no consensus".yellow()),
        PhaseTermination::Interrupted => format!("{} ({percent}%)", "interrupted".red()),
        PhaseTermination::Skipped => "skipped".dimmed().to_string(),
    }
}

impl DiscussionProgress for ProgressReporter {
    fn on_phase_start(&self, phase: &Phase) {
        let pb = self
            .multi
            .add(ProgressBar::new(phase.participating_roles().len() as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(phase.id().display_name().to_string());
        pb.set_message("Starting...");

        if let Ok(mut guard) = self.phase_bar.lock() {
            *guard = Some(pb);
        }
    }

    fn on_round_start(&self, phase: &Phase, round_index: u32, role_count: usize) {
        self.with_bar(|pb| {
            pb.set_length(role_count as u64);
            pb.set_position(0);
            pb.set_message(format!("round {round_index}/{}", phase.max_rounds()));
        });
    }

    fn on_position(&self, _phase: &Phase, position: &Position) {
        self.with_bar(|pb| {
            pb.set_message(format!("{} {}", vote_mark(position), position.role_id));
            pb.inc(1);
        });
    }

    fn on_round_complete(&self, _phase: &Phase, result: &ConsensusResult) {
        self.with_bar(|pb| {
            pb.set_message(format!(
                "round {}: {}% agreement",
                result.round_index,
                result.agreement_percent()
            ));
        });
    }

    fn on_phase_complete(&self, outcome: &PhaseOutcome) {
        let taken = self.phase_bar.lock().ok().and_then(|mut guard| guard.take());
        match taken {
            Some(pb) => pb.finish_with_message(termination_label(outcome)),
            None => {
                // Skipped phases never started a bar.
                let pb = self.multi.add(ProgressBar::new(0));
                pb.set_style(Self::phase_style());
                pb.set_prefix(outcome.phase.display_name().to_string());
                pb.finish_with_message(termination_label(outcome));
            }
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl DiscussionProgress for SimpleProgress {
    fn on_phase_start(&self, phase: &Phase) {
        println!(
            "{} {} ({} roles, up to {} rounds)",
            "->".cyan(),
            phase.id().display_name().bold(),
            phase.participating_roles().len(),
            phase.max_rounds()
        );
    }

    fn on_position(&self, _phase: &Phase, position: &Position) {
        if position.is_fallback() {
            println!("  {} {} (no response)", vote_mark(position), position.role_id);
        } else {
            println!("  {} {} {}", vote_mark(position), position.role_id, position.vote.as_str());
        }
    }

    fn on_round_complete(&self, _phase: &Phase, result: &ConsensusResult) {
        println!(
            "  round {}: {}% agreement",
            result.round_index,
            result.agreement_percent()
        );
    }

    fn on_phase_complete(&self, outcome: &PhaseOutcome) {
        println!("  {}\n", termination_label(outcome));
    }
}
