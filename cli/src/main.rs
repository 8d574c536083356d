//! CLI entrypoint for reel-quorum
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use reel_application::{
    AuditSink, NoAuditSink, ResolveProductionInput, ResolveProductionUseCase,
};
use reel_domain::{ConfigIssue, DecisionFramework, DiscussionMode, OutputFormat};
use reel_infrastructure::{ConfigLoader, FileConfig, JsonlAuditSink, OpenAiConfig, OpenAiGateway};
use reel_presentation::{Cli, ConsoleFormatter, OutputFormatter, ProgressReporter};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so buffered file logs are flushed.
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    info!("Starting reel-quorum");

    // === Configuration ===
    let mut file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    apply_cli_overrides(&cli, &mut file_config);
    let (config, warnings) = ConfigLoader::check(file_config)?;
    log_issues(&warnings);

    let (decision_params, _) = config.production.to_decision_params();
    let framework = DecisionFramework::new(decision_params)?;
    let (discussion_params, _) = config.discussion.to_discussion_params();
    let (registry, _) = config.roles.to_registry();
    let mode = cli
        .discussion
        .map(DiscussionMode::from)
        .unwrap_or_else(|| config.discussion.parse_mode().0);
    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();
    if !config.output.color {
        colored::control::set_override(false);
    }

    let Some(request) = cli.production_request() else {
        bail!("A brief and --duration are required");
    };

    // === Dependency Injection ===
    let provider = OpenAiConfig::from_file(&config.provider);
    if provider.api_key.is_none() && mode != DiscussionMode::Off {
        warn!(
            "No API key found in ${}; requests to {} are sent unauthenticated",
            config.provider.api_key_env, provider.base_url
        );
    }
    info!(model = %provider.model, base_url = %provider.base_url, "Text-generation provider");
    let gateway = Arc::new(OpenAiGateway::new(provider)?);

    let audit = audit_sink(&cli, &config);

    let cancellation = CancellationToken::new();
    spawn_ctrl_c_handler(cancellation.clone());

    let use_case = ResolveProductionUseCase::new(gateway, registry, discussion_params)
        .with_framework(framework)
        .with_audit_sink(audit)
        .with_cancellation(cancellation);

    let input = ResolveProductionInput::new(request, mode);

    // Execute with or without progress reporting
    let aggregation = if cli.quiet {
        use_case.execute(input).await
    } else {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, &progress).await
    }
    .context("Could not resolve the production configuration")?;

    // Output results
    println!("{}", ConsoleFormatter.render(&aggregation, format));

    Ok(())
}

/// Install the stderr subscriber, plus a non-blocking file layer when requested.
///
/// `RUST_LOG` wins over the `-v` count.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .context("--log-file must name a file")?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Could not create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// CLI flags override individual configuration values.
fn apply_cli_overrides(cli: &Cli, config: &mut FileConfig) {
    if let Some(max) = cli.max_in_flight {
        config.discussion.max_in_flight = max;
    }
    if let Some(secs) = cli.role_timeout {
        config.discussion.role_timeout_seconds = secs;
    }
    if let Some(secs) = cli.deadline {
        config.discussion.deadline_seconds = Some(secs);
    }
}

fn audit_sink(cli: &Cli, config: &FileConfig) -> Arc<dyn AuditSink> {
    if cli.no_audit || !config.audit.enabled {
        return Arc::new(NoAuditSink);
    }
    let dir = config.audit.resolved_dir();
    match JsonlAuditSink::in_dir(&dir) {
        Ok(sink) => {
            info!(path = %sink.path().display(), "Writing audit trail");
            Arc::new(sink)
        }
        Err(e) => {
            warn!("Audit trail disabled, could not open {}: {}", dir.display(), e);
            Arc::new(NoAuditSink)
        }
    }
}

fn spawn_ctrl_c_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing with the positions collected so far");
            token.cancel();
        }
    });
}

fn log_issues(issues: &[ConfigIssue]) {
    for issue in issues {
        warn!("{}", issue.message);
    }
}
