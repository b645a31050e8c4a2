use crate::balancer::{Balancer, LeastBytes};
use crate::writer::{Message, MessageWriter, WriterConfig};
use crate::{BuildError, PublishError};
use once_cell::sync::OnceCell;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::ClientConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// librdkafka-backed writer. The producer is thread-safe, so one instance
/// serves every concurrent `write_message` caller.
pub struct KafkaWriter {
    producer: FutureProducer,
    config: WriterConfig,
    least_bytes: Option<LeastBytes>,
    partitions: OnceCell<usize>,
    closed: AtomicBool,
}

impl KafkaWriter {
    /// Creates the producer without contacting any broker.
    pub fn new(config: WriterConfig) -> Result<Self, BuildError> {
        let mut client = ClientConfig::new();
        for (key, value) in config.client_properties() {
            client.set(key, value);
        }
        let producer: FutureProducer =
            client.create().map_err(|e| BuildError::Client(Box::new(e)))?;
        debug!(
            topic = %config.topic,
            brokers = ?config.brokers,
            balancer = ?config.balancer,
            mechanism = config.transport.as_ref().map(|t| t.mechanism().name()),
            "kafka log writer configured"
        );
        let least_bytes = matches!(config.balancer, Balancer::LeastBytes).then(LeastBytes::new);
        Ok(Self {
            producer,
            config,
            least_bytes,
            partitions: OnceCell::new(),
            closed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn partition_count(&self) -> Result<usize, PublishError> {
        self.partitions
            .get_or_try_init(|| {
                let topic = self.config.topic.as_str();
                let metadata = self
                    .producer
                    .client()
                    .fetch_metadata(Some(topic), self.config.metadata_timeout)
                    .map_err(|e| PublishError::Metadata {
                        topic: topic.to_string(),
                        reason: e.to_string(),
                    })?;
                let partitions = metadata
                    .topics()
                    .iter()
                    .find(|t| t.name() == topic)
                    .map(|t| t.partitions().len())
                    .unwrap_or(0);
                if partitions == 0 {
                    return Err(PublishError::Metadata {
                        topic: topic.to_string(),
                        reason: "no partitions reported".into(),
                    });
                }
                Ok(partitions)
            })
            .copied()
    }
}

impl MessageWriter for KafkaWriter {
    fn topic(&self) -> &str {
        &self.config.topic
    }

    fn write_message(&self, message: Message) -> Result<(), PublishError> {
        if self.is_closed() {
            return Err(PublishError::Closed);
        }
        let mut record =
            FutureRecord::<[u8], [u8]>::to(&self.config.topic).payload(message.value.as_slice());
        if let Some(key) = message.key.as_deref() {
            record = record.key(key);
        }
        if let Some(least_bytes) = &self.least_bytes {
            let partitions = self.partition_count()?;
            record = record.partition(least_bytes.pick(partitions, message.value.len()));
        }
        let delivery = self
            .producer
            .send_result(record)
            .map_err(|(err, _)| PublishError::delivery(err))?;
        match futures::executor::block_on(delivery) {
            Ok(Ok(_)) => Ok(()),
            Ok(Err((err, _))) => Err(PublishError::delivery(err)),
            Err(_) => Err(PublishError::Canceled),
        }
    }

    fn sasl_mechanism(&self) -> Option<&'static str> {
        self.config.transport.as_ref().map(|t| t.mechanism().name())
    }

    fn balancer(&self) -> Option<Balancer> {
        Some(self.config.balancer)
    }

    /// Rejects further writes, then flushes. Every call flushes, so a close
    /// whose flush timed out can be retried until the queue drains.
    fn close(&self) -> Result<(), PublishError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(topic = %self.config.topic, "closing kafka log writer");
        }
        self.producer.flush(self.config.flush_timeout).map_err(|err| {
            warn!(topic = %self.config.topic, error = %err, "kafka log writer flush incomplete");
            PublishError::delivery(err)
        })
    }
}
