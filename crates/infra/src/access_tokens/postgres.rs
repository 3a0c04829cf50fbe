use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;

use quill_auth::{AccessTokenRecord, AccessTokenStore, StoreError};
use quill_core::UserId;

use crate::db::map_sqlx_error;

/// Read side of the provider-owned `oauth_access_tokens` table.
#[derive(Debug, Clone)]
pub struct PostgresAccessTokenStore {
    pool: Arc<PgPool>,
}

impl PostgresAccessTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait]
impl AccessTokenStore for PostgresAccessTokenStore {
    #[instrument(skip(self, token), err)]
    async fn find(&self, token: &str) -> Result<Option<AccessTokenRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT token, user_id, expires_at, scope FROM oauth_access_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_access_token", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let decode = |e: sqlx::Error| map_sqlx_error("decode_access_token", e);
        Ok(Some(AccessTokenRecord {
            token: row.try_get("token").map_err(decode)?,
            user_id: UserId::from_uuid(row.try_get::<uuid::Uuid, _>("user_id").map_err(decode)?),
            expires_at: row.try_get::<DateTime<Utc>, _>("expires_at").map_err(decode)?,
            scope: row.try_get("scope").map_err(decode)?,
        }))
    }
}
