//! Registration and login over an injected credential store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::hashing::{self, PasswordError};
use crate::issuer::{IssueError, IssuedToken, TokenIssuer};
use crate::password::{PasswordPolicy, RuleViolation, UserContext};
use crate::store::{CreateUserError, CredentialStore, StoreError};
use crate::user::{NewUser, User};

pub const USERNAME_MAX_CHARS: usize = 150;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9@.+_-]+$").expect("static regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("static regex")
});

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("invalid username")]
    InvalidUsername,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("password does not satisfy policy")]
    PasswordPolicy(Vec<RuleViolation>),

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error(transparent)]
    Hashing(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CreateUserError> for RegistrationError {
    fn from(e: CreateUserError) -> Self {
        match e {
            CreateUserError::DuplicateUsername => RegistrationError::DuplicateUsername,
            CreateUserError::DuplicateEmail => RegistrationError::DuplicateEmail,
            CreateUserError::Store(e) => RegistrationError::Store(e),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// Unknown key or wrong password; the two are indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Hashing(#[from] PasswordError),

    #[error(transparent)]
    Issue(#[from] IssueError),
}

/// Entry point for credential-bearing operations.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    policy: PasswordPolicy,
    issuer: TokenIssuer,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>, policy: PasswordPolicy, issuer: TokenIssuer) -> Self {
        hashing::prepare_dummy_hash();
        Self { store, policy, issuer }
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Validate input, hash the password, then create the user atomically.
    ///
    /// Shape checks and the password policy run before any store access.
    /// The store reports a colliding username ahead of a colliding email.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, RegistrationError> {
        let RegisterRequest { username, email, password } = req;

        if !is_valid_username(&username) {
            return Err(RegistrationError::InvalidUsername);
        }
        if !is_valid_email(&email) {
            return Err(RegistrationError::InvalidEmail);
        }

        self.policy
            .validate(&password, UserContext { username: &username, email: &email })
            .map_err(RegistrationError::PasswordPolicy)?;

        let password_hash = hashing::run_blocking(move || hashing::hash_password(&password)).await??;

        let user = self
            .store
            .create(NewUser {
                username,
                email,
                password_hash,
            })
            .await
            .inspect_err(|e| tracing::info!(error = %e, "registration refused by store"))?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Verify a password for `credentials_key` (username or email) and issue a token.
    pub async fn login(
        &self,
        credentials_key: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, LoginError> {
        let candidate = password.to_owned();
        let Some(user) = self.store.find_by_credentials_key(credentials_key).await? else {
            hashing::run_blocking(move || hashing::verify_against_dummy(&candidate)).await?;
            tracing::info!("login failed: unknown credentials key");
            return Err(LoginError::InvalidCredentials);
        };

        let store = Arc::clone(&self.store);
        let (user, verified) = hashing::run_blocking(move || {
            let verified = store.verify_password(&user, &candidate);
            (user, verified)
        })
        .await?;
        if !verified {
            tracing::info!(username = %user.username, "login failed: wrong password");
            return Err(LoginError::InvalidCredentials);
        }

        let token = self.issuer.issue(&user, now)?;
        tracing::info!(user_id = %user.id, username = %user.username, "login succeeded");
        Ok(token)
    }

    /// Self-signed tokens carry no server state, so there is nothing to revoke.
    pub fn logout(&self) {}
}

impl core::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Authenticator")
            .field("policy", &self.policy)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty() && username.chars().count() <= USERNAME_MAX_CHARS && USERNAME_RE.is_match(username)
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_RE.is_match(email)
}
