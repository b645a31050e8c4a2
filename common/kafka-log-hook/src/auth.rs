use crate::AuthMechanismError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScramAlgorithm {
    Sha256,
    Sha512,
}

impl ScramAlgorithm {
    pub fn mechanism_name(&self) -> &'static str {
        match self {
            ScramAlgorithm::Sha256 => "SCRAM-SHA-256",
            ScramAlgorithm::Sha512 => "SCRAM-SHA-512",
        }
    }
}

impl FromStr for ScramAlgorithm {
    type Err = AuthMechanismError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let digest = normalized.strip_prefix("SCRAM-").unwrap_or(&normalized);
        match digest {
            "SHA-256" | "SHA256" => Ok(ScramAlgorithm::Sha256),
            "SHA-512" | "SHA512" => Ok(ScramAlgorithm::Sha512),
            _ => Err(AuthMechanismError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Transport encryption settings, rendered as librdkafka `ssl.*` properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub ca_location: Option<PathBuf>,
    pub certificate_location: Option<PathBuf>,
    pub key_location: Option<PathBuf>,
    pub key_password: Option<String>,
    pub verify_certificates: bool,
    pub endpoint_identification: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            ca_location: None,
            certificate_location: None,
            key_location: None,
            key_password: None,
            verify_certificates: true,
            endpoint_identification: true,
        }
    }
}

impl TlsConfig {
    pub fn properties(&self) -> Vec<(&'static str, String)> {
        let mut props = Vec::new();
        if let Some(path) = &self.ca_location {
            props.push(("ssl.ca.location", path.display().to_string()));
        }
        if let Some(path) = &self.certificate_location {
            props.push(("ssl.certificate.location", path.display().to_string()));
        }
        if let Some(path) = &self.key_location {
            props.push(("ssl.key.location", path.display().to_string()));
        }
        if let Some(password) = &self.key_password {
            props.push(("ssl.key.password", password.clone()));
        }
        props.push(("enable.ssl.certificate.verification", self.verify_certificates.to_string()));
        let algorithm = if self.endpoint_identification { "https" } else { "none" };
        props.push(("ssl.endpoint.identification.algorithm", algorithm.to_string()));
        props
    }
}

/// Credentials for SASL authentication.
///
/// Leave `algorithm` unset for PLAIN; set it to use SCRAM.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    pub algorithm: Option<ScramAlgorithm>,
    pub tls: TlsConfig,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("tls", &self.tls)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum SaslMechanism {
    Plain { username: String, password: String },
    Scram { algorithm: ScramAlgorithm, username: String, password: String },
}

impl SaslMechanism {
    pub fn plain(username: impl Into<String>, password: impl Into<String>) -> Self {
        SaslMechanism::Plain { username: username.into(), password: password.into() }
    }

    /// Builds a SCRAM mechanism, rejecting credentials SASLprep would refuse.
    pub fn scram(
        algorithm: ScramAlgorithm,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, AuthMechanismError> {
        let username = username.into();
        let password = password.into();
        validate_credential("username", &username)?;
        validate_credential("password", &password)?;
        Ok(SaslMechanism::Scram { algorithm, username, password })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SaslMechanism::Plain { .. } => "PLAIN",
            SaslMechanism::Scram { algorithm, .. } => algorithm.mechanism_name(),
        }
    }

    fn credentials(&self) -> (&str, &str) {
        match self {
            SaslMechanism::Plain { username, password }
            | SaslMechanism::Scram { username, password, .. } => {
                (username.as_str(), password.as_str())
            }
        }
    }
}

impl fmt::Debug for SaslMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaslMechanism")
            .field("name", &self.name())
            .field("username", &self.credentials().0)
            .finish_non_exhaustive()
    }
}

fn validate_credential(field: &'static str, value: &str) -> Result<(), AuthMechanismError> {
    if value.is_empty() {
        return Err(AuthMechanismError::InvalidCredential { field, reason: "must not be empty" });
    }
    if value.chars().any(char::is_control) {
        return Err(AuthMechanismError::InvalidCredential {
            field,
            reason: "contains a prohibited control character",
        });
    }
    Ok(())
}

/// A SASL mechanism bound to a TLS configuration; shared by every
/// connection the writer opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    mechanism: SaslMechanism,
    tls: TlsConfig,
}

impl Transport {
    pub fn new(mechanism: SaslMechanism, tls: TlsConfig) -> Self {
        Self { mechanism, tls }
    }

    /// PLAIN when no algorithm is configured, SCRAM otherwise.
    pub fn from_auth(auth: &AuthConfig) -> Result<Self, AuthMechanismError> {
        let mechanism = match auth.algorithm {
            None => SaslMechanism::plain(auth.username.clone(), auth.password.clone()),
            Some(algorithm) => {
                SaslMechanism::scram(algorithm, auth.username.clone(), auth.password.clone())?
            }
        };
        Ok(Self::new(mechanism, auth.tls.clone()))
    }

    pub fn mechanism(&self) -> &SaslMechanism {
        &self.mechanism
    }

    pub fn tls(&self) -> &TlsConfig {
        &self.tls
    }

    pub fn properties(&self) -> Vec<(&'static str, String)> {
        let (username, password) = self.mechanism.credentials();
        let mut props = vec![
            ("security.protocol", "SASL_SSL".to_string()),
            ("sasl.mechanisms", self.mechanism.name().to_string()),
            ("sasl.username", username.to_string()),
            ("sasl.password", password.to_string()),
        ];
        props.extend(self.tls.properties());
        props
    }
}
