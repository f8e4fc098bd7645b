//! # Plan Applier
//!
//! Executes a plan against the project directory. Operations run in plan order on the
//! calling thread. Each one succeeds or fails on its own: a failure is recorded in the
//! report and the next operation still runs. Nothing is rolled back.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::domain::error::{CoreError, CoreResult};
use crate::domain::plan::{Operation, Plan};
use crate::infrastructure::sandbox::SandboxRoot;

/// Why a single operation did not take effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailReason {
    #[error("path escapes the project root")]
    PathEscape,
    #[error("{0}")]
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome {
    Applied,
    Failed(FailReason),
}

impl OpOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, OpOutcome::Applied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpReport {
    pub operation: Operation,
    pub outcome: OpOutcome,
}

/// Per-operation results, in plan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub entries: Vec<OpReport>,
}

impl ApplyReport {
    pub fn all_applied(&self) -> bool {
        self.entries.iter().all(|e| e.outcome.is_applied())
    }

    pub fn applied_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_applied()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &OpReport> {
        self.entries.iter().filter(|e| !e.outcome.is_applied())
    }

    /// One summary for the user: a success line, or one line per failed operation.
    pub fn summary(&self) -> String {
        if self.all_applied() {
            return crate::strings::messages::CHANGES_APPLIED.to_string();
        }
        self.failures()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for OpReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            OpOutcome::Applied => write!(
                f,
                "{} {}: applied",
                self.operation.kind(),
                self.operation.path()
            ),
            OpOutcome::Failed(reason) => write!(
                f,
                "{} {}: {}",
                self.operation.kind(),
                self.operation.path(),
                reason
            ),
        }
    }
}

/// Apply every operation of `plan` under `root`.
///
/// Fails as a whole only when no project is open, before any operation is touched.
/// All other errors are folded into the returned report.
pub fn apply(plan: Plan, root: Option<&SandboxRoot>) -> CoreResult<ApplyReport> {
    let Some(root) = root else {
        return Err(CoreError::NoProjectOpen);
    };

    tracing::info!(
        "Applying {} change(s) under {}",
        plan.changes().len(),
        root.path().display()
    );

    let entries: Vec<OpReport> = plan
        .changes()
        .iter()
        .map(|op| {
            let outcome = match apply_one(op, root) {
                Ok(()) => {
                    tracing::debug!("{} {}: applied", op.kind(), op.path());
                    OpOutcome::Applied
                }
                Err(reason) => {
                    tracing::warn!("{} {}: {}", op.kind(), op.path(), reason);
                    OpOutcome::Failed(reason)
                }
            };
            OpReport {
                operation: op.clone(),
                outcome,
            }
        })
        .collect();

    let report = ApplyReport { entries };
    tracing::info!(
        "Apply finished: {}/{} applied",
        report.applied_count(),
        report.entries.len()
    );
    Ok(report)
}

fn apply_one(op: &Operation, root: &SandboxRoot) -> Result<(), FailReason> {
    // A delete acts on the entry the plan names: a symlink is unlinked, never followed.
    let resolved = match op {
        Operation::Delete { .. } => root.resolve_entry(op.path()),
        _ => root.resolve(op.path()),
    };
    let target = resolved.map_err(|e| match e {
        CoreError::PathEscape { .. } => FailReason::PathEscape,
        other => FailReason::Io(other.to_string()),
    })?;

    match op {
        Operation::Create { content, .. } | Operation::Update { content, .. } => {
            write_file(&target, content).map_err(io_reason)
        }
        Operation::Delete { .. } => {
            if target == root.path() {
                return Err(FailReason::Io(
                    "refusing to delete the project root".to_string(),
                ));
            }
            delete_path(&target).map_err(io_reason)
        }
    }
}

fn write_file(target: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, content)
}

fn delete_path(target: &Path) -> io::Result<()> {
    let meta = match fs::symlink_metadata(target) {
        Ok(meta) => meta,
        // Already absent.
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    // `symlink_metadata` never reports a link as a directory.
    if meta.is_dir() {
        fs::remove_dir_all(target)
    } else {
        fs::remove_file(target)
    }
}

fn io_reason(e: io::Error) -> FailReason {
    FailReason::Io(e.to_string())
}
