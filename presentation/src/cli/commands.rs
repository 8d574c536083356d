//! CLI command definitions

use clap::{Parser, ValueEnum};
use reel_domain::{DiscussionMode, Language, OutputFormat, Platform, ProductionRequest};
use std::path::PathBuf;

/// Output format for the final configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Core numbers, every phase decision and conflict notes
    Full,
    /// Core numbers and one line per phase
    Summary,
    /// JSON output
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Full => OutputFormat::Full,
            OutputArg::Summary => OutputFormat::Summary,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

/// Discussion preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiscussionArg {
    /// No discussion, core numbers only
    Off,
    /// Script and visuals, one round, core roles
    Light,
    /// Script, audio and visuals, two rounds
    Standard,
    /// Every phase, three rounds
    Deep,
}

impl From<DiscussionArg> for DiscussionMode {
    fn from(arg: DiscussionArg) -> Self {
        match arg {
            DiscussionArg::Off => DiscussionMode::Off,
            DiscussionArg::Light => DiscussionMode::Light,
            DiscussionArg::Standard => DiscussionMode::Standard,
            DiscussionArg::Deep => DiscussionMode::Deep,
        }
    }
}

/// CLI arguments for reel-quorum
#[derive(Parser, Debug)]
#[command(name = "reel-quorum")]
#[command(author, version, about = "Plan a short-form video: fixed numbers first, then a role discussion")]
#[command(long_about = r#"
reel-quorum resolves the production configuration of a short-form video.

The numbers come first and are never negotiated: clip count, per-clip
duration and narration word budget follow from the requested duration.
Production roles (creative director, scriptwriter, editor, ...) then
discuss the creative choices phase by phase until they agree or run out
of rounds.

Configuration files are loaded from (in priority order):
1. --config <path>                        Explicit config file
2. ./reel-quorum.toml                     Project-level config
3. ~/.config/reel-quorum/config.toml      Global config

Example:
  reel-quorum "How octopuses change color" --duration 50
  reel-quorum "Morning routine of a baker" -d 30 --platform tiktok --discussion deep
  reel-quorum "Volcano facts" -d 45 --discussion off --output json
"#)]
pub struct Cli {
    /// What the video is about
    #[arg(required_unless_present = "show_config")]
    pub brief: Option<String>,

    /// Requested total duration in seconds
    #[arg(short, long, value_name = "SECS", required_unless_present = "show_config")]
    pub duration: Option<f64>,

    /// Target platform (youtube-shorts, tiktok, instagram-reels, or any name)
    #[arg(short, long, default_value = "youtube-shorts")]
    pub platform: String,

    /// Narration language tag (e.g. en, en-US, ja)
    #[arg(short, long, default_value = "en")]
    pub language: String,

    /// TTS voice; defaults to the language's narrator voice
    #[arg(long, value_name = "VOICE")]
    pub voice: Option<String>,

    /// Discussion preset (overrides the config file)
    #[arg(long, value_enum)]
    pub discussion: Option<DiscussionArg>,

    /// Maximum concurrent text-generation calls per round
    #[arg(long, value_name = "N")]
    pub max_in_flight: Option<usize>,

    /// Timeout for one role's reply, retries included
    #[arg(long, value_name = "SECS")]
    pub role_timeout: Option<u64>,

    /// Wall-clock budget for the whole discussion
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Output format (overrides the config file)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputArg>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Do not write the JSONL audit trail
    #[arg(long)]
    pub no_audit: bool,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write diagnostic logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// The production request described by the flags, if brief and duration are given.
    pub fn production_request(&self) -> Option<ProductionRequest> {
        let brief = self.brief.as_ref()?;
        let duration = self.duration?;

        let Ok(platform) = self.platform.parse::<Platform>();
        let mut request = ProductionRequest::new(brief.clone(), duration)
            .with_platform(platform)
            .with_language(Language::new(&self.language));
        if let Some(voice) = &self.voice {
            request = request.with_voice(voice.clone());
        }
        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "reel-quorum",
            "Why cats purr",
            "--duration",
            "50",
            "--platform",
            "tiktok",
            "--discussion",
            "deep",
            "--output",
            "json",
            "--deadline",
            "120",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.discussion.map(DiscussionMode::from), Some(DiscussionMode::Deep));
        assert_eq!(cli.output.map(OutputFormat::from), Some(OutputFormat::Json));
        assert_eq!(cli.deadline, Some(120));
        assert_eq!(cli.verbose, 2);

        let request = cli.production_request().unwrap();
        assert_eq!(request.total_duration, 50.0);
        assert_eq!(request.platform, Platform::TikTok);
        assert!(request.voice_override.is_none());
    }

    #[test]
    fn test_brief_and_duration_required() {
        assert!(Cli::try_parse_from(["reel-quorum", "Why cats purr"]).is_err());
        assert!(Cli::try_parse_from(["reel-quorum", "--show-config"]).is_ok());
    }

    #[test]
    fn test_unknown_platform_is_kept() {
        let cli =
            Cli::try_parse_from(["reel-quorum", "brief", "-d", "20", "-p", "snapchat"]).unwrap();
        let request = cli.production_request().unwrap();
        assert_eq!(request.platform, Platform::Other("snapchat".to_string()));
    }
}
