use crate::auth::{AuthConfig, Transport};
use crate::balancer::Balancer;
use crate::{AuthMechanismError, PublishError};
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub key: Option<Vec<u8>>,
    pub value: Vec<u8>,
}

impl Message {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self { key: None, value: value.into() }
    }
}

/// A publishing handle bound to one topic.
///
/// Hooks share a single writer across every thread that logs, so
/// implementations must accept concurrent `write_message` calls. Writers that
/// cannot must serialize access internally.
pub trait MessageWriter: Send + Sync {
    fn topic(&self) -> &str;

    /// One publish attempt; returns once the broker acknowledged or refused it.
    fn write_message(&self, message: Message) -> Result<(), PublishError>;

    /// Flush in-flight messages and reject further writes.
    fn close(&self) -> Result<(), PublishError> {
        Ok(())
    }

    /// Name of the negotiated SASL mechanism, if the writer authenticates.
    fn sasl_mechanism(&self) -> Option<&'static str> {
        None
    }

    fn balancer(&self) -> Option<Balancer> {
        None
    }
}

/// Everything needed to build a producer for one topic.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    pub topic: String,
    pub brokers: Vec<String>,
    pub balancer: Balancer,
    pub transport: Option<Transport>,
    /// Raw librdkafka producer properties applied after the derived ones.
    pub extra: BTreeMap<String, String>,
    pub metadata_timeout: Duration,
    pub flush_timeout: Duration,
}

impl WriterConfig {
    /// Plain-text connection, least-bytes balancing.
    pub fn without_auth(topic: impl Into<String>, brokers: Vec<String>) -> Self {
        Self {
            topic: topic.into(),
            brokers,
            balancer: Balancer::LeastBytes,
            transport: None,
            extra: BTreeMap::new(),
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }

    /// SASL over TLS, hash balancing.
    pub fn with_auth(
        topic: impl Into<String>,
        brokers: Vec<String>,
        auth: &AuthConfig,
    ) -> Result<Self, AuthMechanismError> {
        let transport = Transport::from_auth(auth)?;
        Ok(Self {
            balancer: Balancer::Hash,
            transport: Some(transport),
            ..Self::without_auth(topic, brokers)
        })
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Client properties in application order; later entries win.
    pub fn client_properties(&self) -> Vec<(String, String)> {
        let mut props = vec![("bootstrap.servers".to_string(), self.brokers.join(","))];
        if let Some(partitioner) = self.balancer.partitioner() {
            props.push(("partitioner".into(), partitioner.into()));
        }
        if let Some(transport) = &self.transport {
            props.extend(transport.properties().into_iter().map(|(k, v)| (k.to_string(), v)));
        }
        props.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        props
    }
}
