mod support;

use kafka_log_hook::{
    FormatError, Formatter, HookLayer, HookRegistry, JsonFormatter, KafkaHook, Level, LogEntry,
};
use serde_json::Value;
use std::io;
use std::sync::{Arc, Mutex};
use support::RecordingWriter;
use tracing_subscriber::layer::SubscriberExt;

fn registry_with(hook: KafkaHook) -> HookRegistry {
    let mut registry = HookRegistry::new();
    registry.add(Arc::new(hook)).unwrap();
    registry
}

#[test]
fn forwards_interested_events_as_json() {
    let writer = Arc::new(RecordingWriter::new("app-logs"));
    let levels = [Level::Error, Level::Warn];
    let hook =
        KafkaHook::with_writer("kafka", levels, Arc::new(JsonFormatter::new()), writer.clone());
    let subscriber = tracing_subscriber::registry().with(HookLayer::new(registry_with(hook)));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("not forwarded");
        tracing::warn!(retries = 3, "slow upstream");
        tracing::error!(target: "billing::api", order_id = "A-17", ok = false, "payment declined");
    });

    let messages = writer.messages();
    assert_eq!(messages.len(), 2);

    let warn: Value = serde_json::from_slice(&messages[0].value).unwrap();
    assert_eq!(warn["level"], "warn");
    assert_eq!(warn["msg"], "slow upstream");
    assert_eq!(warn["retries"], 3);

    let error: Value = serde_json::from_slice(&messages[1].value).unwrap();
    assert_eq!(error["level"], "error");
    assert_eq!(error["msg"], "payment declined");
    assert_eq!(error["order_id"], "A-17");
    assert_eq!(error["ok"], false);
    assert_eq!(error["target"], "billing::api");
}

#[test]
fn client_library_events_are_not_forwarded() {
    let writer = Arc::new(RecordingWriter::new("app-logs"));
    let hook =
        KafkaHook::with_writer("kafka", Level::ALL, Arc::new(JsonFormatter::new()), writer.clone());
    let subscriber = tracing_subscriber::registry().with(HookLayer::new(registry_with(hook)));

    tracing::subscriber::with_default(subscriber, || {
        tracing::error!(target: "rdkafka::client", "broker transport failure");
        tracing::error!(target: "kafka_log_hook::kafka", "flushing");
        tracing::error!(target: "app", "kept");
    });

    assert_eq!(writer.messages().len(), 1);
}

#[test]
fn failures_reach_the_error_handler() {
    let writer = Arc::new(RecordingWriter::failing("app-logs", io::ErrorKind::TimedOut));
    let formatter = Arc::new(JsonFormatter::new());
    let hook = KafkaHook::with_writer("kafka", [Level::Error], formatter, writer.clone());
    let reported: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = reported.clone();
    let layer = HookLayer::new(registry_with(hook))
        .with_error_handler(move |id, err| sink.lock().unwrap().push(format!("{id}: {err}")));
    let subscriber = tracing_subscriber::registry().with(layer);

    tracing::subscriber::with_default(subscriber, || {
        tracing::error!("undeliverable");
    });

    let reported = reported.lock().unwrap();
    assert_eq!(reported.len(), 1);
    assert!(reported[0].starts_with("kafka: publish failed"), "got {}", reported[0]);
    assert_eq!(writer.attempts(), 1);
}

#[test]
fn format_failures_are_reported_without_publishing() {
    let writer = Arc::new(RecordingWriter::new("app-logs"));
    let formatter: Arc<dyn Formatter> =
        Arc::new(|_: &LogEntry| -> Result<Vec<u8>, FormatError> {
            Err(FormatError::custom("nope"))
        });
    let hook = KafkaHook::with_writer("kafka", [Level::Warn], formatter, writer.clone());
    let reported: Arc<Mutex<usize>> = Arc::default();
    let sink = reported.clone();
    let layer = HookLayer::new(registry_with(hook))
        .with_error_handler(move |_, _| *sink.lock().unwrap() += 1);
    let subscriber = tracing_subscriber::registry().with(layer);

    tracing::subscriber::with_default(subscriber, || tracing::warn!("disk almost full"));

    assert_eq!(*reported.lock().unwrap(), 1);
    assert_eq!(writer.attempts(), 0);
}
