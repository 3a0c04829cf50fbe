//! Self-signed bearer token issuance.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;
use thiserror::Error;

use crate::claims::TokenClaims;
use crate::config::TokenConfig;
use crate::user::User;

pub const TOKEN_TYPE_BEARER: &str = "bearer";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IssueError {
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Credential handed back to the client after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    /// Reserved. Refresh tokens are not implemented; always `None` (serialized as `null`).
    pub refresh_token: Option<String>,
}

/// Mints HMAC-signed tokens with a fixed lifetime.
///
/// Only call `issue` for a user whose password was just verified.
#[derive(Clone)]
pub struct TokenIssuer {
    header: Header,
    encoding_key: EncodingKey,
    expires_in_secs: i64,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            header: Header::new(config.algorithm),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            expires_in_secs: config.expires_in_secs,
        }
    }

    pub fn expires_in_secs(&self) -> i64 {
        self.expires_in_secs
    }

    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<IssuedToken, IssueError> {
        let iat = now.timestamp();
        let claims = TokenClaims {
            user_id: user.id,
            iat: Some(iat),
            exp: iat + self.expires_in_secs,
        };

        let access_token = encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| IssueError::Signing(e.to_string()))?;

        tracing::debug!(user_id = %user.id, exp = claims.exp, "issued bearer token");

        Ok(IssuedToken {
            access_token,
            token_type: TOKEN_TYPE_BEARER,
            expires_in: self.expires_in_secs,
            refresh_token: None,
        })
    }
}

impl core::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.header.alg)
            .field("expires_in_secs", &self.expires_in_secs)
            .finish_non_exhaustive()
    }
}
