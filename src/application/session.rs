//! # Session
//!
//! Foreground state of one interactive session: the open project, the plan under
//! review, the chat transcript and the offline/online switch.
//!
//! The project root is an explicit value owned here and handed to the applier on
//! every call. Opening a project starts a new epoch; fetch results submitted in an
//! earlier epoch are dropped instead of becoming the current plan, so a slow reply
//! can never be applied to a project the user has already left.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::application::fetch::{FetchEvent, FetchHandle, FetchResult, FetchWorker};
use crate::application::generator::generator_for;
use crate::domain::config::AppConfig;
use crate::domain::error::{CoreError, CoreResult};
use crate::domain::plan::{Plan, PreviewEntry};
use crate::domain::traits::PlanGenerator;
use crate::infrastructure::applier::{self, ApplyReport};
use crate::infrastructure::sandbox::SandboxRoot;
use crate::strings::{logs, messages};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub who: &'static str,
    pub text: String,
}

/// What handling a fetch event changed, for the host to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// A new plan replaced the previous one.
    PlanLoaded { changes: usize },
    /// The generator failed; nothing was decoded.
    FetchFailed(CoreError),
    /// The generator answered but the text is not a plan.
    DecodeFailed(CoreError),
    /// The result belongs to a project that is no longer open.
    Stale,
}

pub struct Session {
    config: AppConfig,
    root: Option<SandboxRoot>,
    epoch: u64,
    plan: Option<Plan>,
    offline: bool,
    transcript: Vec<TranscriptEntry>,
    worker: FetchWorker,
    pending: HashMap<u64, u64>, // ticket -> epoch at submission
    generator_override: Option<Arc<dyn PlanGenerator>>,
}

impl Session {
    /// Build a session and the event receiver its host loop must drain into
    /// [`Session::handle_event`].
    pub fn new(config: AppConfig) -> (Self, mpsc::UnboundedReceiver<FetchEvent>) {
        let timeout = config.system.fetch_timeout.map(Duration::from_secs);
        let (worker, rx) = FetchWorker::new(timeout);
        let offline = config.generator.offline;
        let session = Self {
            config,
            root: None,
            epoch: 0,
            plan: None,
            offline,
            transcript: Vec::new(),
            worker,
            pending: HashMap::new(),
            generator_override: None,
        };
        (session, rx)
    }

    /// Use `generator` for every fetch instead of the configured offline/remote pair.
    pub fn with_generator(mut self, generator: Arc<dyn PlanGenerator>) -> Self {
        self.generator_override = Some(generator);
        self
    }

    pub fn root(&self) -> Option<&SandboxRoot> {
        self.root.as_ref()
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn offline(&self) -> bool {
        self.offline
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
        tracing::info!("Generator mode: {}", messages::mode_label(offline));
    }

    pub fn pending_fetches(&self) -> usize {
        self.pending.len()
    }

    /// Replace the sandbox root. The current plan is dropped and in-flight fetches
    /// become stale.
    pub fn open_project(&mut self, dir: impl AsRef<Path>) -> CoreResult<&SandboxRoot> {
        let root = SandboxRoot::open(dir)?;
        tracing::info!("{}", messages::project_opened(&root.path().display().to_string()));
        self.epoch += 1;
        self.plan = None;
        Ok(self.root.insert(root))
    }

    /// Submit an instruction to the generator for the current mode.
    /// Returns `None` for a blank instruction.
    pub fn send(&mut self, instruction: &str) -> Option<FetchHandle> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return None;
        }
        self.push(messages::USER, instruction);

        let generator = match &self.generator_override {
            Some(generator) => generator.clone(),
            None => generator_for(&self.config.generator, self.offline),
        };
        let handle = self.worker.submit(instruction, generator);
        self.pending.insert(handle.ticket, self.epoch);
        Some(handle)
    }

    /// Fold one fetch result into the session.
    pub fn handle_event(&mut self, event: FetchEvent) -> SessionUpdate {
        let submitted_in = self.pending.remove(&event.ticket);
        if submitted_in != Some(self.epoch) {
            tracing::warn!("{}", logs::stale_fetch_dropped(event.ticket));
            return SessionUpdate::Stale;
        }

        match event.result {
            FetchResult::FetchFailed(err) => {
                tracing::error!("Fetch #{} failed: {}", event.ticket, err);
                self.push(messages::ASSISTANT, messages::fetch_failed(&err.to_string()));
                SessionUpdate::FetchFailed(err)
            }
            FetchResult::PlanReady(raw) => {
                self.push(messages::ASSISTANT, raw.clone());
                match Plan::decode(&raw) {
                    Ok(plan) => {
                        let changes = plan.changes().len();
                        self.push(messages::SYSTEM, messages::plan_ready(changes, plan.notes()));
                        self.plan = Some(plan);
                        SessionUpdate::PlanLoaded { changes }
                    }
                    Err(err) => {
                        tracing::warn!("Fetch #{} returned an unreadable plan: {}", event.ticket, err);
                        self.push(messages::ASSISTANT, messages::decode_failed(&err.to_string()));
                        SessionUpdate::DecodeFailed(err)
                    }
                }
            }
        }
    }

    /// Preview of the current plan, truncated to the configured line count.
    pub fn preview(&self) -> Vec<PreviewEntry> {
        self.plan
            .as_ref()
            .map(|p| p.preview(self.config.system.preview_lines))
            .unwrap_or_default()
    }

    /// Apply and discard the current plan.
    ///
    /// `Ok(None)` when there is no plan. With no project open this fails with
    /// `NoProjectOpen` and the plan is kept for a later attempt.
    pub fn apply(&mut self) -> CoreResult<Option<ApplyReport>> {
        if self.plan.is_none() {
            return Ok(None);
        }
        let Some(root) = self.root.as_ref() else {
            self.push(messages::SYSTEM, messages::apply_failed(&CoreError::NoProjectOpen.to_string()));
            return Err(CoreError::NoProjectOpen);
        };
        let Some(plan) = self.plan.take() else {
            return Ok(None);
        };

        let report = applier::apply(plan, Some(root))?;
        self.push(messages::SYSTEM, report.summary());
        Ok(Some(report))
    }

    fn push(&mut self, who: &'static str, text: impl Into<String>) {
        self.transcript.push(TranscriptEntry {
            who,
            text: text.into(),
        });
    }
}
