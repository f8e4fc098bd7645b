//! # Messages
//!
//! Constant strings and format functions for user-facing messages.

pub const CHANGES_APPLIED: &str = "Changes applied.";
pub const NO_PLAN: &str = "No plan to apply. Send an instruction first.";
pub const EMPTY_INSTRUCTION: &str = "Describe what to create or change.";
pub const WAITING_FOR_PLAN: &str = "Waiting for the generator...";
pub const USER: &str = "You";
pub const ASSISTANT: &str = "AI";
pub const SYSTEM: &str = "System";

pub fn missing_api_key(env_var: &str) -> String {
    format!("{env_var} is not set. Set it or switch back to offline mode.")
}

pub fn project_opened(path: &str) -> String {
    format!("Project: {path}")
}

pub fn fetch_failed(err: &str) -> String {
    format!("AI error: {err}")
}

pub fn decode_failed(err: &str) -> String {
    format!("Could not read the plan: {err}")
}

pub fn plan_ready(count: usize, notes: &str) -> String {
    if notes.is_empty() {
        format!("Plan ready: {count} change(s).")
    } else {
        format!("Plan ready: {count} change(s). {notes}")
    }
}

pub fn apply_failed(err: &str) -> String {
    format!("Apply failed: {err}")
}

pub fn mode_label(offline: bool) -> &'static str {
    if offline { "offline (stub)" } else { "online" }
}
