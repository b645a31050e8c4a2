#![allow(dead_code)]

use kafka_log_hook::{Message, MessageWriter, PublishError};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Thread-safe writer double that records every publish attempt.
pub struct RecordingWriter {
    topic: String,
    messages: Mutex<Vec<Message>>,
    attempts: AtomicUsize,
    fail_with: Option<io::ErrorKind>,
    closed: AtomicBool,
    flush_failures: AtomicUsize,
    flushes: AtomicUsize,
}

impl RecordingWriter {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            messages: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail_with: None,
            closed: AtomicBool::new(false),
            flush_failures: AtomicUsize::new(0),
            flushes: AtomicUsize::new(0),
        }
    }

    /// Writer whose first `failures` flushes time out.
    pub fn with_flush_failures(topic: &str, failures: usize) -> Self {
        let writer = Self::new(topic);
        writer.flush_failures.store(failures, Ordering::SeqCst);
        writer
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn failing(topic: &str, kind: io::ErrorKind) -> Self {
        Self { fail_with: Some(kind), ..Self::new(topic) }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl MessageWriter for RecordingWriter {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn write_message(&self, message: Message) -> Result<(), PublishError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.is_closed() {
            return Err(PublishError::Closed);
        }
        if let Some(kind) = self.fail_with {
            return Err(PublishError::delivery(io::Error::new(kind, "broker unreachable")));
        }
        self.messages.lock().unwrap().push(message);
        Ok(())
    }

    fn close(&self) -> Result<(), PublishError> {
        self.closed.store(true, Ordering::SeqCst);
        self.flushes.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .flush_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            let timeout = io::Error::new(io::ErrorKind::TimedOut, "flush timed out");
            return Err(PublishError::delivery(timeout));
        }
        Ok(())
    }
}
