//! # Interactive Command
//!
//! Handles `tui`: builds a session, opens the project if one is known and hands the
//! terminal to [`TuiApp`] until the user quits.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::application::session::Session;
use crate::domain::config::AppConfig;
use crate::infrastructure::tui::LogBuffer;
use crate::interface::tui::TuiApp;

pub fn handle_tui(
    config: AppConfig,
    project: Option<&Path>,
    offline: bool,
    logs: LogBuffer,
) -> Result<()> {
    let dir = project
        .map(Path::to_path_buf)
        .or_else(|| config.system.project_dir.as_ref().map(PathBuf::from));

    let (mut session, events) = Session::new(config);
    session.set_offline(offline);
    if let Some(dir) = dir
        && let Err(err) = session.open_project(&dir)
    {
        // Not fatal: the user can still /open another directory.
        tracing::warn!("Could not open {}: {}", dir.display(), err);
    }

    let mut app = TuiApp::new(session, events, logs);
    let terminal = ratatui::init();
    let res = app.run(terminal);
    ratatui::restore();
    res
}
