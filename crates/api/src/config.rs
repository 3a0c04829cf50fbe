//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{Context, bail};

use quill_auth::{PasswordPolicy, SigningSecret, TokenConfig, parse_algorithm};
use quill_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub token: TokenConfig,
    pub password_policy: PasswordPolicy,
    pub bind_addr: SocketAddr,
    /// Postgres stores are used when set; in-memory otherwise.
    pub database_url: Option<String>,
    pub log_format: LogFormat,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("QUILL_SECRET_KEY").context("QUILL_SECRET_KEY must be set")?;
        let secret = SigningSecret::new(secret).context("invalid QUILL_SECRET_KEY")?;

        let mut token = TokenConfig::new(secret);
        if let Some(alg) = lookup("QUILL_JWT_ALGORITHM") {
            let alg = parse_algorithm(&alg).context("invalid QUILL_JWT_ALGORITHM")?;
            token = token.with_algorithm(alg)?;
        }
        if let Some(ttl) = parse_opt::<i64>(&lookup, "QUILL_TOKEN_TTL_SECS")? {
            token = token.with_expires_in(ttl)?;
        }
        if let Some(leeway) = parse_opt::<i64>(&lookup, "QUILL_TOKEN_LEEWAY_SECS")? {
            if leeway < 0 {
                bail!("QUILL_TOKEN_LEEWAY_SECS must not be negative (got {leeway})");
            }
            token = token.with_leeway(leeway);
        }

        let min_length = parse_opt::<usize>(&lookup, "QUILL_PASSWORD_MIN_LENGTH")?
            .unwrap_or(quill_auth::password::DEFAULT_MIN_LENGTH);
        let max_similarity = parse_opt::<f64>(&lookup, "QUILL_PASSWORD_MAX_SIMILARITY")?
            .unwrap_or(quill_auth::password::DEFAULT_MAX_SIMILARITY);
        if !(0.0..=1.0).contains(&max_similarity) {
            bail!("QUILL_PASSWORD_MAX_SIMILARITY must be within 0.0..=1.0 (got {max_similarity})");
        }

        let bind_addr = lookup("QUILL_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid QUILL_BIND_ADDR '{bind_addr}'"))?;

        Ok(Self {
            token,
            password_policy: PasswordPolicy::with_thresholds(min_length, max_similarity),
            bind_addr,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            log_format: lookup(quill_observability::tracing::LOG_FORMAT_ENV)
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        })
    }
}

fn parse_opt<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("invalid {key} '{raw}'")))
        .transpose()
}
