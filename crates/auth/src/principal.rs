use serde::Serialize;

use quill_core::UserId;

use crate::user::User;

/// Resolved identity attached to a request after token validation.
///
/// Only the token validator builds one, from a user it just looked up, so a
/// `Principal` is always complete. Equality is by id.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    id: UserId,
    username: String,
    email: String,
}

impl Principal {
    pub(crate) fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl PartialEq for Principal {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Principal {}

impl core::hash::Hash for Principal {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
