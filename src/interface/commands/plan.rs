//! # Plan Commands
//!
//! Handles `plan`, `apply` and `apply-file`: one instruction (or one saved plan) per
//! invocation, rendered to text for the terminal.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use tokio::sync::mpsc;

use crate::application::fetch::FetchEvent;
use crate::application::render::{render_preview, render_report};
use crate::application::session::{Session, SessionUpdate};
use crate::domain::config::AppConfig;
use crate::domain::plan::Plan;
use crate::infrastructure::applier;
use crate::infrastructure::sandbox::SandboxRoot;

/// Text to print and whether the command fully succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

pub async fn handle_plan(
    config: AppConfig,
    instruction: &str,
    project: Option<&Path>,
    offline: bool,
) -> Result<CommandOutput> {
    let (mut session, mut events) = prepare(config, project, offline)?;
    fetch(&mut session, &mut events, instruction).await?;

    let mut text = String::new();
    if let Some(plan) = session.plan()
        && !plan.notes().is_empty()
    {
        text.push_str(&format!("Notes: {}\n\n", plan.notes()));
    }
    text.push_str(&render_preview(&session.preview()));
    Ok(CommandOutput {
        text,
        success: true,
    })
}

pub async fn handle_apply(
    config: AppConfig,
    instruction: &str,
    project: Option<&Path>,
    offline: bool,
) -> Result<CommandOutput> {
    let (mut session, mut events) = prepare(config, project, offline)?;
    fetch(&mut session, &mut events, instruction).await?;

    let report = session
        .apply()?
        .ok_or_else(|| anyhow!("The generator returned no plan"))?;
    Ok(CommandOutput {
        text: render_report(&report),
        success: report.all_applied(),
    })
}

pub fn handle_apply_file(
    config: &AppConfig,
    plan_path: &Path,
    project: Option<&Path>,
) -> Result<CommandOutput> {
    let raw = std::fs::read_to_string(plan_path)
        .with_context(|| format!("Failed to read plan file {}", plan_path.display()))?;
    let plan = Plan::decode(&raw)
        .with_context(|| format!("Failed to decode plan file {}", plan_path.display()))?;

    let root = match project_dir(config, project) {
        Some(dir) => Some(SandboxRoot::open(&dir)?),
        None => None,
    };
    let report = applier::apply(plan, root.as_ref())?;
    tracing::info!("Apply finished: {}", report.summary());

    Ok(CommandOutput {
        text: render_report(&report),
        success: report.all_applied(),
    })
}

/// `--project` wins over `system.project_dir`.
fn project_dir(config: &AppConfig, project: Option<&Path>) -> Option<PathBuf> {
    project
        .map(Path::to_path_buf)
        .or_else(|| config.system.project_dir.as_ref().map(PathBuf::from))
}

fn prepare(
    config: AppConfig,
    project: Option<&Path>,
    offline: bool,
) -> Result<(Session, mpsc::UnboundedReceiver<FetchEvent>)> {
    let dir = project_dir(&config, project);
    let (mut session, events) = Session::new(config);
    session.set_offline(offline);
    if let Some(dir) = dir {
        session.open_project(&dir)?;
    }
    Ok((session, events))
}

async fn fetch(
    session: &mut Session,
    events: &mut mpsc::UnboundedReceiver<FetchEvent>,
    instruction: &str,
) -> Result<()> {
    if session.send(instruction).is_none() {
        bail!(crate::strings::messages::EMPTY_INSTRUCTION);
    }
    let event = events
        .recv()
        .await
        .context("Fetch worker stopped before delivering a result")?;

    match session.handle_event(event) {
        SessionUpdate::PlanLoaded { .. } => Ok(()),
        SessionUpdate::FetchFailed(err) | SessionUpdate::DecodeFailed(err) => Err(err.into()),
        SessionUpdate::Stale => bail!("Fetch result was discarded"),
    }
}
