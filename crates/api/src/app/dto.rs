use serde::{Deserialize, Serialize};

use quill_auth::{Principal, User};
use quill_core::UserId;

// -------------------------
// Request DTOs
// -------------------------

/// `username` may also hold an email address.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Shaped like the login response; nothing in it is checked.
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserOut {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<&Principal> for UserOut {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id(),
            username: principal.username().to_string(),
            email: principal.email().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageOut {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessOut {
    pub success: bool,
}

impl SuccessOut {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
