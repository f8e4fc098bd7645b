pub const STARTING: &str = "Starting Plan Studio...";
pub const SHUTDOWN: &str = "Shutting down...";
pub const CONFIG_READ_ERROR: &str = "Failed to load configuration";

pub fn config_loaded(path: &str) -> String {
    format!("Loaded configuration from {path}")
}

pub fn fetch_submitted(ticket: u64, generator: &str) -> String {
    format!("Fetch #{ticket} submitted to {generator}")
}

pub fn fetch_completed(ticket: u64, ok: bool) -> String {
    if ok {
        format!("Fetch #{ticket} delivered a plan")
    } else {
        format!("Fetch #{ticket} failed")
    }
}

pub fn stale_fetch_dropped(ticket: u64) -> String {
    format!("Dropping result of fetch #{ticket}: the project changed since it was submitted")
}
