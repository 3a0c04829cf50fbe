//! Argon2id password hashing.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use once_cell::sync::Lazy;
use password_hash::{PasswordHash as PhcHash, SaltString};
use thiserror::Error;

use crate::user::PasswordHash;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("failed to generate salt: {0}")]
    Salt(String),

    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("password worker failed: {0}")]
    Worker(String),
}

/// Hash a plaintext password into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<PasswordHash, PasswordError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;

    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();
    Ok(PasswordHash::from_phc(phc))
}

/// Check `candidate` against a stored hash.
///
/// The digest comparison inside argon2 is constant-time. An unparsable stored
/// hash verifies as `false`.
pub fn verify_password(hash: &PasswordHash, candidate: &str) -> bool {
    match PhcHash::new(hash.as_str()) {
        Ok(parsed) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Run argon2 work on the blocking pool instead of an executor thread.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, PasswordError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PasswordError::Worker(e.to_string()))
}

static DUMMY_HASH: Lazy<Option<PasswordHash>> = Lazy::new(|| hash_password("quill-dummy-password").ok());

/// Compute the dummy hash now so the first unknown-key login does not pay for it.
pub fn prepare_dummy_hash() {
    Lazy::force(&DUMMY_HASH);
}

#[cfg(test)]
pub(crate) fn dummy_hash_ready() -> bool {
    matches!(Lazy::get(&DUMMY_HASH), Some(Some(_)))
}

/// Burn one verification when no user matched, so an unknown login key takes
/// as long as a wrong password.
pub fn verify_against_dummy(candidate: &str) {
    if let Some(hash) = DUMMY_HASH.as_ref() {
        let _ = verify_password(hash, candidate);
    }
}
