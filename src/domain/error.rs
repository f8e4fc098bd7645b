//! # Error Taxonomy
//!
//! Every failure the change-plan engine can report. Nothing here is fatal to the
//! process: callers receive these as data and render them.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// An apply or resolve was attempted before a project directory was opened.
    #[error("No project is open. Open a project folder first.")]
    NoProjectOpen,

    /// A path canonicalized to somewhere outside the sandbox root.
    #[error("Path escapes the project root: {path}")]
    PathEscape { path: String },

    /// The generator response is not a valid plan document.
    #[error("Malformed plan: {0}")]
    MalformedPlan(String),

    /// No credential or endpoint is configured for the remote generator.
    #[error("Generation service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Transport or service-side failure. The detail is kept verbatim for display.
    #[error("Remote error: {0}")]
    RemoteError(String),

    /// Opening a project root failed (missing directory, permission, ...).
    #[error("I/O error: {0}")]
    Io(String),
}

impl CoreError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedPlan(detail.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
