//! # Command Line
//!
//! Argument definitions and the handlers behind each subcommand.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod interactive;
pub mod plan;

/// Turn natural-language instructions into reviewed file changes inside a project directory.
#[derive(Parser, Debug)]
#[command(name = "plan-studio", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the YAML configuration (defaults to data/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a plan and print its preview without touching any file
    Plan {
        #[arg(required = true, num_args = 1..)]
        instruction: Vec<String>,
        /// Project directory (overrides system.project_dir)
        #[arg(long)]
        project: Option<PathBuf>,
        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Generate a plan and apply it to the project
    Apply {
        #[arg(required = true, num_args = 1..)]
        instruction: Vec<String>,
        #[arg(long)]
        project: Option<PathBuf>,
        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Apply a plan previously saved as JSON
    ApplyFile {
        plan: PathBuf,
        #[arg(long)]
        project: Option<PathBuf>,
    },
    /// Interactive terminal session
    Tui {
        #[arg(long)]
        project: Option<PathBuf>,
        #[command(flatten)]
        mode: ModeArgs,
    },
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ModeArgs {
    /// Use the offline stub generator
    #[arg(long, conflicts_with = "online")]
    pub offline: bool,
    /// Use the configured remote provider
    #[arg(long)]
    pub online: bool,
}

impl ModeArgs {
    /// Offline or not, falling back to `default` when neither flag is given.
    pub fn resolve(self, default: bool) -> bool {
        if self.offline {
            true
        } else if self.online {
            false
        } else {
            default
        }
    }
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, Command::Tui { .. })
    }
}
