use crate::formatter::Formatter;
use crate::writer::{Message, MessageWriter};
use crate::{HookError, Level, LogEntry};
use std::sync::Arc;

#[cfg(feature = "kafka-producer")]
use crate::{auth::AuthConfig, kafka::KafkaWriter, writer::WriterConfig, BuildError};

/// The contract a logging pipeline needs from a hook.
pub trait Hook: Send + Sync {
    /// Stable identifier; registries use it to reject duplicates.
    fn id(&self) -> &str;

    /// Levels this hook wants to receive. Filtering is the caller's job.
    fn levels(&self) -> &[Level];

    fn fire(&self, entry: &LogEntry) -> Result<(), HookError>;
}

/// Formats entries and publishes each one as a single message to a fixed topic.
///
/// The hook never retries or buffers: every `fire` is exactly one publish
/// attempt and its failure is returned to the caller. Call [`KafkaHook::close`]
/// during shutdown to flush in-flight messages.
#[derive(Clone)]
pub struct KafkaHook {
    id: String,
    levels: Vec<Level>,
    formatter: Arc<dyn Formatter>,
    writer: Arc<dyn MessageWriter>,
}

impl KafkaHook {
    /// Builds a hook around an existing writer.
    pub fn with_writer(
        id: impl Into<String>,
        levels: impl IntoIterator<Item = Level>,
        formatter: Arc<dyn Formatter>,
        writer: Arc<dyn MessageWriter>,
    ) -> Self {
        let mut unique: Vec<Level> = Vec::new();
        for level in levels {
            if !unique.contains(&level) {
                unique.push(level);
            }
        }
        Self { id: id.into(), levels: unique, formatter, writer }
    }

    /// Unauthenticated hook with least-bytes balancing.
    #[cfg(feature = "kafka-producer")]
    pub fn new(
        id: impl Into<String>,
        levels: impl IntoIterator<Item = Level>,
        formatter: Arc<dyn Formatter>,
        topic: impl Into<String>,
        brokers: Vec<String>,
    ) -> Result<Self, BuildError> {
        let writer = KafkaWriter::new(WriterConfig::without_auth(topic, brokers))?;
        Ok(Self::with_writer(id, levels, formatter, Arc::new(writer)))
    }

    /// SASL/TLS hook with hash balancing. PLAIN unless `auth.algorithm` is set.
    #[cfg(feature = "kafka-producer")]
    pub fn new_with_sasl_auth(
        id: impl Into<String>,
        levels: impl IntoIterator<Item = Level>,
        formatter: Arc<dyn Formatter>,
        topic: impl Into<String>,
        brokers: Vec<String>,
        auth: &AuthConfig,
    ) -> Result<Self, BuildError> {
        let config = WriterConfig::with_auth(topic, brokers, auth)?;
        let writer = KafkaWriter::new(config)?;
        Ok(Self::with_writer(id, levels, formatter, Arc::new(writer)))
    }

    pub fn writer(&self) -> &Arc<dyn MessageWriter> {
        &self.writer
    }

    pub fn topic(&self) -> &str {
        self.writer.topic()
    }

    /// Flushes and closes the writer. Must be called by the owner at shutdown.
    pub fn close(&self) -> Result<(), HookError> {
        self.writer.close()?;
        Ok(())
    }
}

impl Hook for KafkaHook {
    fn id(&self) -> &str {
        &self.id
    }

    fn levels(&self) -> &[Level] {
        &self.levels
    }

    fn fire(&self, entry: &LogEntry) -> Result<(), HookError> {
        let value = self.formatter.format(entry)?;
        self.writer.write_message(Message::new(value))?;
        Ok(())
    }
}

impl std::fmt::Debug for KafkaHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaHook")
            .field("id", &self.id)
            .field("levels", &self.levels)
            .field("topic", &self.writer.topic())
            .finish_non_exhaustive()
    }
}
