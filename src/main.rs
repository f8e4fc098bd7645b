//! # Main Entry Point
//!
//! Loads configuration, sets up logging and dispatches the selected subcommand.
//! Logs always go to `<data_dir>/session.log`; the CLI also prints them to stderr, the
//! TUI shows them in its log panel instead.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use plan_studio::domain::config::{AppConfig, DEFAULT_CONFIG_PATH};
use plan_studio::infrastructure::tui::{TuiLogLayer, log_buffer};
use plan_studio::interface::commands::{Cli, Command, interactive, plan};
use plan_studio::strings::logs;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = AppConfig::load(&config_path).context(logs::CONFIG_READ_ERROR)?;

    // 2. Logging Setup
    let data_dir = PathBuf::from(&config.system.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    // Each run starts a fresh session log.
    let log_path = data_dir.join("session.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(&data_dir, "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper=warn,reqwest=warn"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let interactive = cli.is_interactive();
    let tui_logs = log_buffer();
    let tui_layer = interactive.then(|| TuiLogLayer::new(tui_logs.clone()));
    let console_layer =
        (!interactive).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .with(tui_layer)
        .init();

    tracing::info!("{}", logs::STARTING);
    if config_path.exists() {
        tracing::info!("{}", logs::config_loaded(&config_path.display().to_string()));
    }

    // 3. Dispatch
    let default_offline = config.generator.offline;
    let output = match cli.command {
        Command::Plan {
            instruction,
            project,
            mode,
        } => {
            plan::handle_plan(
                config,
                &instruction.join(" "),
                project.as_deref(),
                mode.resolve(default_offline),
            )
            .await?
        }
        Command::Apply {
            instruction,
            project,
            mode,
        } => {
            plan::handle_apply(
                config,
                &instruction.join(" "),
                project.as_deref(),
                mode.resolve(default_offline),
            )
            .await?
        }
        Command::ApplyFile { plan: path, project } => {
            plan::handle_apply_file(&config, &path, project.as_deref())?
        }
        Command::Tui { project, mode } => {
            interactive::handle_tui(
                config,
                project.as_deref(),
                mode.resolve(default_offline),
                tui_logs,
            )
            .context("Terminal session failed")?;
            tracing::info!("{}", logs::SHUTDOWN);
            return Ok(ExitCode::SUCCESS);
        }
    };

    print!("{}", output.text);
    if !output.text.ends_with('\n') {
        println!();
    }
    tracing::info!("{}", logs::SHUTDOWN);

    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
