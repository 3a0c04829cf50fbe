use std::sync::Arc;

use anyhow::Context;

use quill_auth::{AccessTokenStore, Authenticator, Clock, CredentialStore, TokenIssuer};
use quill_infra::{
    ContentRepository, InMemoryAccessTokenStore, InMemoryContentRepository, InMemoryCredentialStore,
    PostgresAccessTokenStore, PostgresCredentialStore, db,
};

use crate::config::ApiConfig;

/// Store backends the API runs on.
#[derive(Clone)]
pub struct Backends {
    pub users: Arc<dyn CredentialStore>,
    pub access_tokens: Arc<dyn AccessTokenStore>,
    pub content: Arc<dyn ContentRepository>,
}

impl Backends {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryCredentialStore::new()),
            access_tokens: Arc::new(InMemoryAccessTokenStore::new()),
            content: Arc::new(InMemoryContentRepository::new()),
        }
    }

    /// Credentials and opaque tokens in Postgres; content stays in memory.
    pub async fn postgres(database_url: &str) -> anyhow::Result<Self> {
        let pool = db::connect(database_url, 10)
            .await
            .context("failed to connect to DATABASE_URL")?;
        db::ensure_schema(&pool).await.context("failed to ensure schema")?;

        Ok(Self {
            users: Arc::new(PostgresCredentialStore::new(pool.clone())),
            access_tokens: Arc::new(PostgresAccessTokenStore::new(pool)),
            content: Arc::new(InMemoryContentRepository::new()),
        })
    }

    pub async fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        match &config.database_url {
            Some(url) => {
                tracing::info!("using postgres credential stores");
                Self::postgres(url).await
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory stores");
                Ok(Self::in_memory())
            }
        }
    }
}

/// Everything handlers need, shared behind one `Arc`.
pub struct AppServices {
    pub auth: Authenticator,
    pub content: Arc<dyn ContentRepository>,
    pub clock: Arc<dyn Clock>,
}

pub fn build_services(config: &ApiConfig, backends: &Backends, clock: Arc<dyn Clock>) -> AppServices {
    AppServices {
        auth: Authenticator::new(
            backends.users.clone(),
            config.password_policy.clone(),
            TokenIssuer::new(&config.token),
        ),
        content: backends.content.clone(),
        clock,
    }
}
