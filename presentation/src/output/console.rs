//! Console output formatter for the final configuration

use crate::output::formatter::OutputFormatter;
use colored::{ColoredString, Colorize};
use reel_domain::core::string::{squash_whitespace, truncate};
use reel_domain::production::decision::format_seconds;
use reel_domain::{Aggregation, CoreDecision, PhaseDecision, PhaseTermination, RunStatus};

/// Longest decision text shown per phase in the summary view
const SUMMARY_DECISION_LEN: usize = 100;

/// Formats the final configuration for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete result
    pub fn format_full(aggregation: &Aggregation) -> String {
        let config = &aggregation.configuration;
        let mut output = String::new();

        output.push_str(&Self::header("Production Configuration"));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Brief:".cyan().bold(), config.brief()));
        output.push_str(&format!(
            "{} {}   {} {}   {} {}\n",
            "Run:".cyan().bold(),
            config.run_id(),
            "Discussion:".cyan().bold(),
            config.mode(),
            "Status:".cyan().bold(),
            Self::status(config.status())
        ));

        output.push_str(&Self::section_header("Core Decision"));
        output.push_str(&Self::core_lines(config.core()));

        output.push_str(&Self::section_header("Phase Decisions"));
        if config.phase_decisions().is_empty() {
            output.push_str(&format!("\n{}\n", "No discussion was held.".dimmed()));
        }
        for decision in config.phase_decisions() {
            output.push_str(&format!(
                "\n{} {}\n",
                format!("── {} ──", decision.phase.display_name()).yellow().bold(),
                Self::phase_stats(decision).dimmed()
            ));
            if decision.decision.is_empty() {
                output.push_str(&format!("{}\n", "(no decision)".dimmed()));
            } else {
                output.push_str(&Self::indent(&decision.decision, "  "));
                output.push('\n');
            }
            if decision.low_confidence {
                output.push_str(&format!(
                    "  {}\n",
                    "low confidence: no role agreed, strongest proposal kept".yellow()
                ));
            }
        }

        if !aggregation.conflicts.is_empty() {
            output.push_str(&format!("\n{}\n", "Corrected to the core decision:".yellow().bold()));
            for conflict in &aggregation.conflicts {
                output.push_str(&format!("  * {}\n", conflict.describe()));
            }
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(aggregation: &Aggregation) -> String {
        serde_json::to_string_pretty(aggregation).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format core numbers plus one line per phase (concise output)
    pub fn format_summary(aggregation: &Aggregation) -> String {
        let config = &aggregation.configuration;
        let core = config.core();
        let mut output = String::new();

        output.push_str(&format!(
            "{} {}\n\n",
            "=== Production Plan ===".cyan().bold(),
            Self::status(config.status())
        ));
        output.push_str(&format!("{} {}\n", "Brief:".bold(), config.brief()));
        output.push_str(&format!(
            "{} {} clips x ≤{}s, {} words, voice {}\n",
            "Plan:".bold(),
            core.clip_count(),
            format_seconds(core.per_clip_duration_bound()),
            core.word_budget(),
            core.voice()
        ));

        for decision in config.phase_decisions() {
            let text = if decision.decision.is_empty() {
                "(no decision)".dimmed().to_string()
            } else {
                truncate(&squash_whitespace(&decision.decision), SUMMARY_DECISION_LEN)
            };
            output.push_str(&format!(
                "{:<9} {:>4}  {}\n",
                format!("{}:", decision.phase.display_name()).bold(),
                format!("{:.0}%", decision.agreement_fraction * 100.0),
                text
            ));
        }

        if !aggregation.conflicts.is_empty() {
            output.push_str(&format!(
                "{}\n",
                format!("{} number(s) corrected to the core decision", aggregation.conflicts.len())
                    .dimmed()
            ));
        }

        output
    }

    fn core_lines(core: &CoreDecision) -> String {
        let (min, max) = core.tolerance().bounds(core.total_duration());
        let mut lines = vec![
            format!("  Duration:     {}s", format_seconds(core.total_duration())),
            format!(
                "  Clips:        {} x ≤{}s",
                core.clip_count(),
                format_seconds(core.per_clip_duration_bound())
            ),
            format!(
                "  Word budget:  {} words at {} words/s",
                core.word_budget(),
                core.speech_rate()
            ),
            format!("  Language:     {} (voice {})", core.language(), core.voice()),
            format!(
                "  Platform:     {} (±{}%: {}s to {}s)",
                core.platform().display_name(),
                core.tolerance().percent(),
                format_seconds(min),
                format_seconds(max)
            ),
        ];
        if core.exceeds_platform_limit()
            && let Some(limit) = core.platform().max_duration()
        {
            lines.push(format!(
                "  {}",
                format!("warning: longer than the platform's {}s limit", format_seconds(limit)).yellow()
            ));
        }
        format!("\n{}\n", lines.join("\n"))
    }

    fn phase_stats(decision: &PhaseDecision) -> String {
        let by = decision
            .decided_by
            .as_ref()
            .map(|r| format!(", by {r}"))
            .unwrap_or_default();
        let ending = match decision.termination {
            PhaseTermination::ConsensusReached => "consensus",
            PhaseTermination::RoundsExhausted => "rounds exhausted",
            PhaseTermination::Interrupted => "interrupted",
            PhaseTermination::Skipped => "skipped",
        };
        format!(
            "{:.0}% agreement, {} round(s), {ending}{by}",
            decision.agreement_fraction * 100.0,
            decision.rounds
        )
    }

    fn status(status: RunStatus) -> ColoredString {
        match status {
            RunStatus::Completed => status.as_str().green().bold(),
            RunStatus::Degraded => status.as_str().yellow().bold(),
            RunStatus::Failed => status.as_str().red().bold(),
            RunStatus::InProgress => status.as_str().normal(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_full(&self, aggregation: &Aggregation) -> String {
        Self::format_full(aggregation)
    }

    fn format_summary(&self, aggregation: &Aggregation) -> String {
        Self::format_summary(aggregation)
    }

    fn format_json(&self, aggregation: &Aggregation) -> String {
        Self::format_json(aggregation)
    }
}
