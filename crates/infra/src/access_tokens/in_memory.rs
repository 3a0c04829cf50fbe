use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use quill_auth::{AccessTokenRecord, AccessTokenStore, StoreError};

/// In-memory opaque-token table.
///
/// `insert`/`revoke` stand in for the external provider that owns these
/// records; the auth layer only ever calls `find`.
#[derive(Debug, Default)]
pub struct InMemoryAccessTokenStore {
    tokens: RwLock<HashMap<String, AccessTokenRecord>>,
}

impl InMemoryAccessTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: AccessTokenRecord) {
        if let Ok(mut map) = self.tokens.write() {
            map.insert(record.token.clone(), record);
        }
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.tokens
            .write()
            .map(|mut map| map.remove(token).is_some())
            .unwrap_or(false)
    }
}

#[async_trait]
impl AccessTokenStore for InMemoryAccessTokenStore {
    async fn find(&self, token: &str) -> Result<Option<AccessTokenRecord>, StoreError> {
        let map = self
            .tokens
            .read()
            .map_err(|_| StoreError::Backend("access token store lock poisoned".to_string()))?;
        Ok(map.get(token).cloned())
    }
}
