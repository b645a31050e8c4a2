use std::error::Error as StdError;
use thiserror::Error;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum AuthMechanismError {
    #[error("unsupported SCRAM algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("invalid SASL {field}: {reason}")]
    InvalidCredential { field: &'static str, reason: &'static str },
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("format error: {0}")]
    Custom(String),
}

impl FormatError {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("writer closed")]
    Closed,
    #[error("metadata unavailable for topic '{topic}': {reason}")]
    Metadata { topic: String, reason: String },
    #[error("publish failed: {0}")]
    Delivery(#[source] BoxError),
    #[error("delivery canceled before a broker acknowledgement arrived")]
    Canceled,
}

impl PublishError {
    /// Wraps an underlying client failure; the cause stays reachable via `source()`.
    pub fn delivery(err: impl Into<BoxError>) -> Self {
        Self::Delivery(err.into())
    }
}

/// Failure returned from `Hook::fire`.
#[derive(Debug, Error)]
pub enum HookError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Failure while constructing a hook and its writer.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("auth mechanism: {0}")]
    Auth(#[from] AuthMechanismError),
    #[error("kafka client: {0}")]
    Client(#[source] BoxError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {key}='{value}': {reason}")]
    Invalid { key: &'static str, value: String, reason: String },
    #[error(transparent)]
    Auth(#[from] AuthMechanismError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a hook with id '{0}' is already registered")]
    DuplicateId(String),
}
