use crate::auth::{AuthConfig, ScramAlgorithm, TlsConfig};
use crate::formatter::{Formatter, JsonFormatter, TextFormatter};
use crate::{ConfigError, Level};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(feature = "kafka-producer")]
use crate::{hook::KafkaHook, BuildError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

/// Hook settings read from `KAFKA_LOG_*` environment variables.
#[derive(Debug, Clone)]
pub struct HookSettings {
    pub id: String,
    pub brokers: Vec<String>,
    pub topic: String,
    pub levels: Vec<Level>,
    pub format: LogFormat,
    pub auth: Option<AuthConfig>,
}

impl HookSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`HookSettings::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).and_then(|value| normalize_optional(&value));

        let id = get("KAFKA_LOG_HOOK_ID").unwrap_or_else(|| "kafka".to_string());
        let brokers = get("KAFKA_LOG_BROKERS")
            .map(|value| parse_list(&value))
            .filter(|list| !list.is_empty())
            .ok_or(ConfigError::Missing("KAFKA_LOG_BROKERS"))?;
        let topic = get("KAFKA_LOG_TOPIC").ok_or(ConfigError::Missing("KAFKA_LOG_TOPIC"))?;

        let levels = match get("KAFKA_LOG_LEVELS") {
            Some(value) => parse_levels(&value)?,
            None => Level::at_least(Level::Warn),
        };

        let format = match get("KAFKA_LOG_FORMAT").map(|v| v.to_ascii_lowercase()) {
            None => LogFormat::Json,
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) if v == "text" => LogFormat::Text,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    key: "KAFKA_LOG_FORMAT",
                    value: v,
                    reason: "expected 'json' or 'text'".into(),
                })
            }
        };

        let auth = match get("KAFKA_LOG_SASL_USERNAME") {
            None => None,
            Some(username) => {
                let algorithm = get("KAFKA_LOG_SASL_ALGORITHM")
                    .map(|value| value.parse::<ScramAlgorithm>())
                    .transpose()?;
                let verify_certificates = match get("KAFKA_LOG_SSL_VERIFY") {
                    Some(value) => parse_bool("KAFKA_LOG_SSL_VERIFY", &value)?,
                    None => true,
                };
                Some(AuthConfig {
                    username,
                    password: get("KAFKA_LOG_SASL_PASSWORD").unwrap_or_default(),
                    algorithm,
                    tls: TlsConfig {
                        ca_location: get("KAFKA_LOG_SSL_CA_LOCATION").map(PathBuf::from),
                        certificate_location: get("KAFKA_LOG_SSL_CERTIFICATE_LOCATION")
                            .map(PathBuf::from),
                        key_location: get("KAFKA_LOG_SSL_KEY_LOCATION").map(PathBuf::from),
                        key_password: get("KAFKA_LOG_SSL_KEY_PASSWORD"),
                        verify_certificates,
                        ..TlsConfig::default()
                    },
                })
            }
        };

        Ok(Self { id, brokers, topic, levels, format, auth })
    }

    pub fn formatter(&self) -> Arc<dyn Formatter> {
        match self.format {
            LogFormat::Json => Arc::new(JsonFormatter::new()),
            LogFormat::Text => Arc::new(TextFormatter::new()),
        }
    }

    /// Authenticated hook when SASL credentials are configured, plain otherwise.
    #[cfg(feature = "kafka-producer")]
    pub fn build_hook(&self) -> Result<KafkaHook, BuildError> {
        let formatter = self.formatter();
        let levels = self.levels.iter().copied();
        match &self.auth {
            Some(auth) => KafkaHook::new_with_sasl_auth(
                self.id.clone(),
                levels,
                formatter,
                self.topic.clone(),
                self.brokers.clone(),
                auth,
            ),
            None => KafkaHook::new(
                self.id.clone(),
                levels,
                formatter,
                self.topic.clone(),
                self.brokers.clone(),
            ),
        }
    }
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_levels(value: &str) -> Result<Vec<Level>, ConfigError> {
    let mut levels = Vec::new();
    for item in parse_list(value) {
        let level = item.parse::<Level>().map_err(|e| ConfigError::Invalid {
            key: "KAFKA_LOG_LEVELS",
            value: item.clone(),
            reason: e.to_string(),
        })?;
        if !levels.contains(&level) {
            levels.push(level);
        }
    }
    if levels.is_empty() {
        return Err(ConfigError::Invalid {
            key: "KAFKA_LOG_LEVELS",
            value: value.to_string(),
            reason: "no levels listed".into(),
        });
    }
    Ok(levels)
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected a boolean".into(),
        }),
    }
}
