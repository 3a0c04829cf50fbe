use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use quill_auth::{CreateUserError, CredentialStore, NewUser, StoreError, User};
use quill_core::UserId;

/// In-memory credential store for tests/dev.
///
/// `create` performs both duplicate checks and the insert under one write
/// lock, so colliding concurrent registrations serialize.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop a user record. Outstanding tokens for it stop resolving.
    pub fn remove(&self, id: UserId) -> Option<User> {
        self.users.write().ok()?.remove(&id)
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("credential store lock poisoned".to_string())
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_credentials_key(&self, username_or_email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        let by_username = users.values().find(|u| u.username == username_or_email);
        Ok(by_username
            .or_else(|| users.values().find(|u| u.email == username_or_email))
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, CreateUserError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;

        if users.values().any(|u| u.username == new_user.username) {
            return Err(CreateUserError::DuplicateUsername);
        }
        if users.values().any(|u| u.email == new_user.email) {
            return Err(CreateUserError::DuplicateEmail);
        }

        let user = User {
            id: UserId::new(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}
