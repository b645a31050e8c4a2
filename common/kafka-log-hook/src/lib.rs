//! Log hook that publishes formatted entries to a Kafka topic.
//!
//! ```no_run
//! # #[cfg(feature = "kafka-producer")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kafka_log_hook::{HookLayer, HookRegistry, JsonFormatter, KafkaHook, Level};
//! use std::sync::Arc;
//! use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
//!
//! let hook = Arc::new(KafkaHook::new(
//!     "kafka",
//!     [Level::Error, Level::Warn],
//!     Arc::new(JsonFormatter::new()),
//!     "application-logs",
//!     vec!["localhost:9092".to_string()],
//! )?);
//! let mut registry = HookRegistry::new();
//! registry.add(hook.clone())?;
//! tracing_subscriber::registry().with(HookLayer::new(registry)).init();
//!
//! tracing::error!(order_id = 42, "payment declined");
//! hook.close()?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "kafka-producer"))]
//! # fn main() {}
//! ```

pub mod auth;
pub mod balancer;
pub mod entry;
pub mod error;
pub mod formatter;
pub mod hook;
#[cfg(feature = "kafka-producer")]
pub mod kafka;
pub mod layer;
pub mod level;
pub mod registry;
pub mod settings;
pub mod writer;

pub use auth::{AuthConfig, SaslMechanism, ScramAlgorithm, TlsConfig, Transport};
pub use balancer::{Balancer, LeastBytes};
pub use entry::LogEntry;
pub use error::{
    AuthMechanismError, BuildError, ConfigError, FormatError, HookError, PublishError,
    RegistryError,
};
pub use formatter::{Formatter, JsonFormatter, TextFormatter};
pub use hook::{Hook, KafkaHook};
#[cfg(feature = "kafka-producer")]
pub use kafka::KafkaWriter;
pub use layer::HookLayer;
pub use level::{Level, ParseLevelError};
pub use registry::HookRegistry;
pub use settings::{HookSettings, LogFormat};
pub use writer::{Message, MessageWriter, WriterConfig};
