//! Bridges `tracing` events into registered hooks.
//!
//! ```text
//! tracing::Event -> HookLayer -> LogEntry -> HookRegistry -> Hook::fire -> MessageWriter
//! ```

use crate::registry::HookRegistry;
use crate::{HookError, Level, LogEntry};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Targets never forwarded to hooks; publishing them would feed back into the writer.
const SUPPRESSED_TARGETS: [&str; 3] = ["rdkafka", "librdkafka", env!("CARGO_CRATE_NAME")];

type ErrorHandler = Arc<dyn Fn(&str, &HookError) + Send + Sync>;

pub struct HookLayer {
    registry: HookRegistry,
    on_error: ErrorHandler,
}

impl HookLayer {
    pub fn new(registry: HookRegistry) -> Self {
        Self { registry, on_error: Arc::new(report_to_stderr) }
    }

    /// Replaces the default stderr report for hooks that fail to fire.
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &HookError) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(handler);
        self
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }
}

fn report_to_stderr(id: &str, err: &HookError) {
    eprintln!("failed to fire hook {id}: {err}");
}

fn is_suppressed(target: &str) -> bool {
    SUPPRESSED_TARGETS
        .iter()
        .any(|prefix| target == *prefix || target.starts_with(&format!("{prefix}::")))
}

impl<S> Layer<S> for HookLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Level::from(metadata.level());
        if !self.registry.wants(level) || is_suppressed(metadata.target()) {
            return;
        }

        let mut visitor = EntryVisitor::default();
        event.record(&mut visitor);
        let mut entry = LogEntry::new(level, visitor.message.unwrap_or_default());
        entry.fields = visitor.fields.into_iter().collect();
        entry
            .fields
            .entry("target".to_string())
            .or_insert_with(|| Value::String(metadata.target().to_string()));

        for (id, err) in self.registry.fire(&entry) {
            (self.on_error)(&id, &err);
        }
    }
}

#[derive(Default)]
struct EntryVisitor {
    message: Option<String>,
    fields: Vec<(String, Value)>,
}

impl EntryVisitor {
    fn put(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for EntryVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        let number = serde_json::Number::from_f64(value).map(Value::Number);
        self.put(field, number.unwrap_or(Value::Null));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::String(value.to_string()));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, Value::String(format!("{value:?}")));
    }
}
