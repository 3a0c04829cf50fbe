//! Store interfaces consumed by the auth layer.
//!
//! Both stores are injected (`Arc<dyn ...>`); implementations live in
//! `quill-infra`. A missing row is `Ok(None)`, never an error, so "not found"
//! can't be confused with an infrastructure failure.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quill_core::UserId;

use crate::hashing;
use crate::user::{NewUser, User};

/// Infrastructure failure (unreachable backend, failed transaction, ...).
///
/// Fatal to the current request; nothing in the auth layer retries it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CreateUserError {
    #[error("username already exists")]
    DuplicateUsername,

    #[error("email already exists")]
    DuplicateEmail,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Holder of user identity and password-hash records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look a user up by username or, failing that, by email.
    async fn find_by_credentials_key(&self, username_or_email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Atomically insert a user.
    ///
    /// Username is checked before email. Two concurrent calls with a colliding
    /// username or email must not both succeed.
    async fn create(&self, new_user: NewUser) -> Result<User, CreateUserError>;

    /// Constant-time check of `candidate` against the user's stored hash.
    fn verify_password(&self, user: &User, candidate: &str) -> bool {
        hashing::verify_password(&user.password_hash, candidate)
    }
}

#[async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn find_by_credentials_key(&self, username_or_email: &str) -> Result<Option<User>, StoreError> {
        (**self).find_by_credentials_key(username_or_email).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn create(&self, new_user: NewUser) -> Result<User, CreateUserError> {
        (**self).create(new_user).await
    }

    fn verify_password(&self, user: &User, candidate: &str) -> bool {
        (**self).verify_password(user, candidate)
    }
}

/// Opaque access token issued by an external provider.
///
/// Read-only here: the auth layer never creates or revokes these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenRecord {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub scope: String,
}

impl AccessTokenRecord {
    /// Expired once `now` reaches `expires_at` (shifted by `leeway_secs`).
    pub fn is_expired(&self, now: DateTime<Utc>, leeway_secs: i64) -> bool {
        self.expires_at + chrono::Duration::seconds(leeway_secs) <= now
    }
}

/// Externally owned opaque-token table.
#[async_trait]
pub trait AccessTokenStore: Send + Sync {
    /// Exact-match lookup of a token string.
    async fn find(&self, token: &str) -> Result<Option<AccessTokenRecord>, StoreError>;
}

#[async_trait]
impl<S> AccessTokenStore for Arc<S>
where
    S: AccessTokenStore + ?Sized,
{
    async fn find(&self, token: &str) -> Result<Option<AccessTokenRecord>, StoreError> {
        (**self).find(token).await
    }
}
