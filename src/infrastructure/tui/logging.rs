use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;

use crate::infrastructure::tui::{LOG_CAPACITY, LogBuffer, LogEntry};

pub struct TuiLogLayer {
    pub logs: LogBuffer,
}

impl TuiLogLayer {
    pub fn new(logs: LogBuffer) -> Self {
        Self { logs }
    }
}

impl<S> Layer<S> for TuiLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        let level = event.metadata().level().to_string();

        let mut visitor = MessageVisitor::new();
        event.record(&mut visitor);

        // Never block inside a tracing call: the UI thread may hold the lock while drawing.
        if let Ok(mut guard) = self.logs.try_lock() {
            guard.push_back(LogEntry {
                timestamp,
                level,
                message: visitor.message,
            });
            if guard.len() > LOG_CAPACITY {
                guard.pop_front();
            }
        }
    }
}

struct MessageVisitor {
    message: String,
}

impl MessageVisitor {
    fn new() -> Self {
        Self {
            message: String::new(),
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}
