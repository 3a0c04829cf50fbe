//! Token configuration (secret, algorithm, expiry window, leeway).
//!
//! Built once at startup and shared read-only; the issuer and validator
//! derive their keys from it at construction.

use jsonwebtoken::Algorithm;
use thiserror::Error;

pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("unsupported signing algorithm '{0}' (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),

    #[error("token lifetime must be positive (got {0}s)")]
    InvalidLifetime(i64),
}

/// Symmetric signing secret. `Debug` never prints the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: SigningSecret,
    /// HMAC algorithm negotiated at configuration time.
    pub algorithm: Algorithm,
    /// Fixed validity window of issued tokens.
    pub expires_in_secs: i64,
    /// Clock-skew allowance applied to expiry checks. Zero keeps expiry strict.
    pub leeway_secs: i64,
}

impl TokenConfig {
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            algorithm: Algorithm::HS256,
            expires_in_secs: DEFAULT_EXPIRES_IN_SECS,
            leeway_secs: 0,
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Result<Self, ConfigError> {
        self.algorithm = hmac_only(algorithm)?;
        Ok(self)
    }

    pub fn with_expires_in(mut self, secs: i64) -> Result<Self, ConfigError> {
        if secs <= 0 {
            return Err(ConfigError::InvalidLifetime(secs));
        }
        self.expires_in_secs = secs;
        Ok(self)
    }

    pub fn with_leeway(mut self, secs: i64) -> Self {
        self.leeway_secs = secs.max(0);
        self
    }
}

fn hmac_only(algorithm: Algorithm) -> Result<Algorithm, ConfigError> {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(ConfigError::UnsupportedAlgorithm(format!("{other:?}"))),
    }
}

/// Parse an algorithm name as found in configuration.
pub fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    match name.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(ConfigError::UnsupportedAlgorithm(name.to_string())),
    }
}
