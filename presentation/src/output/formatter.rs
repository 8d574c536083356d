//! Output formatter trait

use reel_domain::{Aggregation, OutputFormat};

/// Trait for rendering the outcome of a run
pub trait OutputFormatter {
    /// Core numbers, every phase decision and conflict notes
    fn format_full(&self, aggregation: &Aggregation) -> String;

    /// Core numbers and one line per phase
    fn format_summary(&self, aggregation: &Aggregation) -> String;

    /// Format as JSON
    fn format_json(&self, aggregation: &Aggregation) -> String;

    fn render(&self, aggregation: &Aggregation, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format_full(aggregation),
            OutputFormat::Summary => self.format_summary(aggregation),
            OutputFormat::Json => self.format_json(aggregation),
        }
    }
}
