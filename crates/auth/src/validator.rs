//! Bearer token validation over two schemes.
//!
//! Each protected endpoint is wired to exactly one `TokenValidator` variant:
//!
//! - `SelfSigned`: HMAC-signed token carrying `{user_id, exp}` (plus `iat` when
//!   issued here); validity is
//!   signature + expiry, then the subject must still exist in the credential store.
//! - `Opaque`: token string issued by an external provider; validity is an
//!   exact-match lookup in the access-token store plus that record's expiry.
//!
//! Every rejection cause collapses into `AuthOutcome::Unauthenticated`. The cause
//! is logged at debug level and nowhere else. Store failures are not
//! authentication decisions and surface as `Err(StoreError)`.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, Validation, decode};
use thiserror::Error;

use crate::claims::{TokenClaims, validate_claims};
use crate::config::TokenConfig;
use crate::principal::Principal;
use crate::store::{AccessTokenStore, CredentialStore, StoreError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenScheme {
    SelfSigned,
    Opaque,
}

impl core::fmt::Display for TokenScheme {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TokenScheme::SelfSigned => f.write_str("self_signed"),
            TokenScheme::Opaque => f.write_str("opaque"),
        }
    }
}

/// Result of validating one bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(Principal),
    Unauthenticated,
}

impl AuthOutcome {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthOutcome::Authenticated(p) => Some(p),
            AuthOutcome::Unauthenticated => None,
        }
    }

    pub fn into_principal(self) -> Option<Principal> {
        match self {
            AuthOutcome::Authenticated(p) => Some(p),
            AuthOutcome::Unauthenticated => None,
        }
    }
}

/// Internal rejection cause. Logged, never returned to callers.
#[derive(Debug, Error)]
enum Rejection {
    #[error("empty token")]
    Empty,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("bad signature")]
    BadSignature,
    #[error("algorithm mismatch")]
    WrongAlgorithm,
    #[error("claims rejected: {0}")]
    Claims(#[from] crate::claims::TokenValidationError),
    #[error("subject no longer exists")]
    UnknownSubject,
    #[error("unknown opaque token")]
    UnknownToken,
    #[error("opaque token expired")]
    ExpiredToken,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validator for self-signed (HMAC) tokens.
pub struct SelfSignedValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway_secs: i64,
    users: Arc<dyn CredentialStore>,
}

impl SelfSignedValidator {
    pub fn new(config: &TokenConfig, users: Arc<dyn CredentialStore>) -> Self {
        let mut validation = Validation::new(config.algorithm);
        validation.algorithms = vec![config.algorithm];
        // Expiry is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            leeway_secs: config.leeway_secs,
            users,
        }
    }

    fn decode_claims(&self, raw: &str) -> Result<TokenClaims, Rejection> {
        decode::<TokenClaims>(raw, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => Rejection::BadSignature,
                ErrorKind::InvalidAlgorithm => Rejection::WrongAlgorithm,
                _ => Rejection::Malformed(e.to_string()),
            })
    }

    async fn resolve(&self, raw: &str, now: DateTime<Utc>) -> Result<Principal, Rejection> {
        let claims = self.decode_claims(raw)?;
        validate_claims(&claims, now, self.leeway_secs)?;

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or(Rejection::UnknownSubject)?;
        Ok(Principal::from_user(&user))
    }
}

/// Validator for opaque tokens owned by an external provider.
pub struct OpaqueValidator {
    tokens: Arc<dyn AccessTokenStore>,
    users: Arc<dyn CredentialStore>,
    leeway_secs: i64,
}

impl OpaqueValidator {
    pub fn new(tokens: Arc<dyn AccessTokenStore>, users: Arc<dyn CredentialStore>, leeway_secs: i64) -> Self {
        Self {
            tokens,
            users,
            leeway_secs: leeway_secs.max(0),
        }
    }

    async fn resolve(&self, raw: &str, now: DateTime<Utc>) -> Result<Principal, Rejection> {
        let record = self.tokens.find(raw).await?.ok_or(Rejection::UnknownToken)?;
        if record.is_expired(now, self.leeway_secs) {
            return Err(Rejection::ExpiredToken);
        }

        let user = self
            .users
            .find_by_id(record.user_id)
            .await?
            .ok_or(Rejection::UnknownSubject)?;
        Ok(Principal::from_user(&user))
    }
}

/// One of exactly two validation schemes, chosen per endpoint at startup.
pub enum TokenValidator {
    SelfSigned(SelfSignedValidator),
    Opaque(OpaqueValidator),
}

impl TokenValidator {
    pub fn self_signed(config: &TokenConfig, users: Arc<dyn CredentialStore>) -> Self {
        Self::SelfSigned(SelfSignedValidator::new(config, users))
    }

    pub fn opaque(tokens: Arc<dyn AccessTokenStore>, users: Arc<dyn CredentialStore>, leeway_secs: i64) -> Self {
        Self::Opaque(OpaqueValidator::new(tokens, users, leeway_secs))
    }

    pub fn scheme(&self) -> TokenScheme {
        match self {
            TokenValidator::SelfSigned(_) => TokenScheme::SelfSigned,
            TokenValidator::Opaque(_) => TokenScheme::Opaque,
        }
    }

    /// Turn a raw bearer token into a principal, or a flat rejection.
    ///
    /// Nothing is cached between calls.
    pub async fn validate(&self, raw: &str, now: DateTime<Utc>) -> Result<AuthOutcome, StoreError> {
        let resolved = if raw.is_empty() {
            Err(Rejection::Empty)
        } else {
            match self {
                TokenValidator::SelfSigned(v) => v.resolve(raw, now).await,
                TokenValidator::Opaque(v) => v.resolve(raw, now).await,
            }
        };

        match resolved {
            Ok(principal) => Ok(AuthOutcome::Authenticated(principal)),
            Err(Rejection::Store(e)) => {
                tracing::error!(scheme = %self.scheme(), error = %e, "credential lookup failed during token validation");
                Err(e)
            }
            Err(reason) => {
                tracing::debug!(scheme = %self.scheme(), %reason, "bearer token rejected");
                Ok(AuthOutcome::Unauthenticated)
            }
        }
    }
}

impl core::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("TokenValidator").field(&self.scheme()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    use async_trait::async_trait;
    use chrono::Duration;
    use jsonwebtoken::Algorithm;
    use proptest::prelude::*;

    use quill_core::UserId;

    use crate::config::SigningSecret;
    use crate::issuer::TokenIssuer;
    use crate::store::{AccessTokenRecord, CreateUserError};
    use crate::user::{NewUser, PasswordHash, User};

    #[derive(Default)]
    struct FakeUsers {
        users: RwLock<HashMap<UserId, User>>,
        broken: bool,
    }

    impl FakeUsers {
        fn with(user: User) -> Arc<Self> {
            let store = Self::default();
            store.users.write().unwrap().insert(user.id, user);
            Arc::new(store)
        }

        fn remove(&self, id: UserId) {
            self.users.write().unwrap().remove(&id);
        }
    }

    #[async_trait]
    impl CredentialStore for FakeUsers {
        async fn find_by_credentials_key(&self, key: &str) -> Result<Option<User>, StoreError> {
            Ok(self
                .users
                .read()
                .unwrap()
                .values()
                .find(|u| u.username == key || u.email == key)
                .cloned())
        }

        async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
            if self.broken {
                return Err(StoreError::Unavailable("down".to_string()));
            }
            Ok(self.users.read().unwrap().get(&id).cloned())
        }

        async fn create(&self, _new_user: NewUser) -> Result<User, CreateUserError> {
            unreachable!("not used by validator tests")
        }
    }

    struct FakeTokens(HashMap<String, AccessTokenRecord>);

    #[async_trait]
    impl AccessTokenStore for FakeTokens {
        async fn find(&self, token: &str) -> Result<Option<AccessTokenRecord>, StoreError> {
            Ok(self.0.get(token).cloned())
        }
    }

    fn alice() -> User {
        User {
            id: UserId::new(),
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: PasswordHash::from_phc("unused"),
        }
    }

    fn config(secret: &str) -> TokenConfig {
        TokenConfig::new(SigningSecret::new(secret).unwrap())
    }

    #[tokio::test]
    async fn issued_token_resolves_to_its_user() {
        let user = alice();
        let cfg = config("server-secret");
        let now = Utc::now();
        let token = TokenIssuer::new(&cfg).issue(&user, now).unwrap();
        let validator = TokenValidator::self_signed(&cfg, FakeUsers::with(user.clone()));

        let outcome = validator.validate(&token.access_token, now).await.unwrap();
        let principal = outcome.into_principal().expect("authenticated");
        assert_eq!(principal.id(), user.id);
        assert_eq!(principal.username(), "alice");
        assert_eq!(principal.email(), "a@x.com");
    }

    #[tokio::test]
    async fn token_without_issued_at_is_accepted_until_expiry() {
        let user = alice();
        let cfg = config("server-secret");
        let now = Utc::now();
        let raw = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(Algorithm::HS256),
            &serde_json::json!({ "user_id": user.id, "exp": now.timestamp() + 600 }),
            &jsonwebtoken::EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap();
        let validator = TokenValidator::self_signed(&cfg, FakeUsers::with(user.clone()));

        let outcome = validator.validate(&raw, now).await.unwrap();
        assert_eq!(outcome.principal().map(Principal::id), Some(user.id));

        assert_eq!(
            validator.validate(&raw, now + Duration::seconds(600)).await.unwrap(),
            AuthOutcome::Unauthenticated
        );
    }

    #[tokio::test]
    async fn replay_after_window_is_unauthenticated() {
        let user = alice();
        let cfg = config("server-secret");
        let t0 = Utc::now();
        let token = TokenIssuer::new(&cfg).issue(&user, t0).unwrap();
        let validator = TokenValidator::self_signed(&cfg, FakeUsers::with(user));

        let later = t0 + Duration::seconds(3601);
        assert_eq!(
            validator.validate(&token.access_token, later).await.unwrap(),
            AuthOutcome::Unauthenticated
        );
    }

    #[tokio::test]
    async fn configured_leeway_tolerates_small_skew() {
        let user = alice();
        let cfg = config("server-secret").with_leeway(5);
        let t0 = Utc::now();
        let token = TokenIssuer::new(&cfg).issue(&user, t0).unwrap();
        let validator = TokenValidator::self_signed(&cfg, FakeUsers::with(user));

        let outcome = validator
            .validate(&token.access_token, t0 + Duration::seconds(3602))
            .await
            .unwrap();
        assert!(outcome.principal().is_some());
    }

    #[tokio::test]
    async fn mismatched_algorithm_is_unauthenticated() {
        let user = alice();
        let signer = config("server-secret").with_algorithm(Algorithm::HS512).unwrap();
        let now = Utc::now();
        let token = TokenIssuer::new(&signer).issue(&user, now).unwrap();
        let validator = TokenValidator::self_signed(&config("server-secret"), FakeUsers::with(user));

        assert_eq!(
            validator.validate(&token.access_token, now).await.unwrap(),
            AuthOutcome::Unauthenticated
        );
    }

    #[tokio::test]
    async fn unsigned_and_garbage_tokens_are_unauthenticated() {
        let validator = TokenValidator::self_signed(&config("server-secret"), FakeUsers::with(alice()));
        let now = Utc::now();
        for raw in ["", "not-a-token", "a.b.c", "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.e30."] {
            assert_eq!(validator.validate(raw, now).await.unwrap(), AuthOutcome::Unauthenticated);
        }
    }

    #[tokio::test]
    async fn deleted_subject_is_unauthenticated() {
        let user = alice();
        let cfg = config("server-secret");
        let now = Utc::now();
        let token = TokenIssuer::new(&cfg).issue(&user, now).unwrap();
        let users = FakeUsers::with(user.clone());
        let validator = TokenValidator::self_signed(&cfg, users.clone());

        users.remove(user.id);
        assert_eq!(
            validator.validate(&token.access_token, now).await.unwrap(),
            AuthOutcome::Unauthenticated
        );
    }

    #[tokio::test]
    async fn store_failure_is_not_an_authentication_decision() {
        let user = alice();
        let cfg = config("server-secret");
        let now = Utc::now();
        let token = TokenIssuer::new(&cfg).issue(&user, now).unwrap();
        let users = Arc::new(FakeUsers {
            broken: true,
            ..FakeUsers::default()
        });
        let validator = TokenValidator::self_signed(&cfg, users);

        assert!(matches!(
            validator.validate(&token.access_token, now).await,
            Err(StoreError::Unavailable(_))
        ));
    }

    fn opaque_fixture(user: &User, expires_at: DateTime<Utc>) -> TokenValidator {
        let record = AccessTokenRecord {
            token: "opaque-abc".to_string(),
            user_id: user.id,
            expires_at,
            scope: "read write".to_string(),
        };
        let tokens = FakeTokens(HashMap::from([(record.token.clone(), record)]));
        TokenValidator::opaque(Arc::new(tokens), FakeUsers::with(user.clone()), 0)
    }

    #[tokio::test]
    async fn opaque_token_resolves_until_its_expiry() {
        let user = alice();
        let now = Utc::now();
        let validator = opaque_fixture(&user, now + Duration::seconds(60));
        assert_eq!(validator.scheme(), TokenScheme::Opaque);

        let principal = validator
            .validate("opaque-abc", now)
            .await
            .unwrap()
            .into_principal()
            .unwrap();
        assert_eq!(principal.id(), user.id);

        assert_eq!(
            validator.validate("opaque-abc", now + Duration::seconds(60)).await.unwrap(),
            AuthOutcome::Unauthenticated
        );
    }

    #[tokio::test]
    async fn opaque_lookup_is_exact_match() {
        let user = alice();
        let now = Utc::now();
        let validator = opaque_fixture(&user, now + Duration::seconds(60));
        for raw in ["opaque-ab", "OPAQUE-ABC", "opaque-abc "] {
            assert_eq!(validator.validate(raw, now).await.unwrap(), AuthOutcome::Unauthenticated);
        }
    }

    #[tokio::test]
    async fn schemes_do_not_accept_each_others_tokens() {
        let user = alice();
        let cfg = config("server-secret");
        let now = Utc::now();
        let jwt = TokenIssuer::new(&cfg).issue(&user, now).unwrap().access_token;

        let opaque = opaque_fixture(&user, now + Duration::seconds(60));
        assert_eq!(opaque.validate(&jwt, now).await.unwrap(), AuthOutcome::Unauthenticated);

        let self_signed = TokenValidator::self_signed(&cfg, FakeUsers::with(user));
        assert_eq!(
            self_signed.validate("opaque-abc", now).await.unwrap(),
            AuthOutcome::Unauthenticated
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 32,
            ..ProptestConfig::default()
        })]

        /// Property: a token signed with any other secret never authenticates.
        #[test]
        fn foreign_secret_never_authenticates(secret in "[a-zA-Z0-9]{1,48}") {
            prop_assume!(secret != "server-secret");
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let user = alice();
            let now = Utc::now();
            let forged = TokenIssuer::new(&config(&secret)).issue(&user, now).unwrap();
            let validator = TokenValidator::self_signed(&config("server-secret"), FakeUsers::with(user));

            let outcome = rt.block_on(validator.validate(&forged.access_token, now)).unwrap();
            prop_assert_eq!(outcome, AuthOutcome::Unauthenticated);
        }
    }
}
