//! Integration tests for the full credential pipeline.
//!
//! Tests: register → login → validate → mutate owned content
//!
//! Verifies:
//! - A registered user can log in and the token resolves back to them
//! - Expired tokens are rejected on replay
//! - Concurrent registrations with a colliding username never both succeed
//! - Ownership is enforced across the token → principal → repository path

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use quill_auth::{
        AccessTokenRecord, AuthOutcome, Authenticator, Clock, LoginError, ManualClock, PasswordPolicy, Principal,
        RegisterRequest, RegistrationError, SigningSecret, TokenConfig, TokenIssuer, TokenValidator,
    };
    use quill_core::{BlogEntryUpdate, NewBlogEntry};

    use crate::access_tokens::InMemoryAccessTokenStore;
    use crate::content::{ContentError, ContentRepository, InMemoryContentRepository};
    use crate::credentials::InMemoryCredentialStore;

    struct Harness {
        users: Arc<InMemoryCredentialStore>,
        auth: Authenticator,
        validator: TokenValidator,
        clock: ManualClock,
    }

    fn setup() -> Harness {
        let users = Arc::new(InMemoryCredentialStore::new());
        let cfg = TokenConfig::new(SigningSecret::new("integration-secret").unwrap());
        let auth = Authenticator::new(users.clone(), PasswordPolicy::default(), TokenIssuer::new(&cfg));
        let validator = TokenValidator::self_signed(&cfg, users.clone());
        Harness {
            users,
            auth,
            validator,
            clock: ManualClock::new(Utc::now()),
        }
    }

    fn req(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    async fn login_principal(h: &Harness, key: &str, password: &str) -> Principal {
        let token = h.auth.login(key, password, h.clock.now()).await.unwrap();
        h.validator
            .validate(&token.access_token, h.clock.now())
            .await
            .unwrap()
            .into_principal()
            .unwrap()
    }

    #[tokio::test]
    async fn register_login_identity_round_trip() {
        let h = setup();
        let user = h.auth.register(req("alice", "a@x.com", "Str0ng!Pass1")).await.unwrap();

        let principal = login_principal(&h, "alice", "Str0ng!Pass1").await;
        assert_eq!(principal.id(), user.id);
        assert_eq!(principal.username(), "alice");
        assert_eq!(principal.email(), "a@x.com");
    }

    #[tokio::test]
    async fn failed_login_leaves_user_untouched() {
        let h = setup();
        let user = h.auth.register(req("alice", "a@x.com", "Str0ng!Pass1")).await.unwrap();

        assert_eq!(
            h.auth.login("alice", "wrong-password", h.clock.now()).await,
            Err(LoginError::InvalidCredentials)
        );
        assert_eq!(h.users.len(), 1);
        assert!(h.auth.login("alice", "Str0ng!Pass1", h.clock.now()).await.is_ok());
        assert_eq!(login_principal(&h, "a@x.com", "Str0ng!Pass1").await.id(), user.id);
    }

    #[tokio::test]
    async fn token_replayed_after_window_is_rejected() {
        let h = setup();
        h.auth.register(req("alice", "a@x.com", "Str0ng!Pass1")).await.unwrap();
        let token = h.auth.login("alice", "Str0ng!Pass1", h.clock.now()).await.unwrap();

        h.clock.advance(Duration::seconds(3599));
        assert!(matches!(
            h.validator.validate(&token.access_token, h.clock.now()).await,
            Ok(AuthOutcome::Authenticated(_))
        ));

        h.clock.advance(Duration::seconds(2));
        assert_eq!(
            h.validator.validate(&token.access_token, h.clock.now()).await,
            Ok(AuthOutcome::Unauthenticated)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicate_registration_has_one_winner() {
        let h = Arc::new(setup());

        let mut handles = Vec::new();
        for i in 0..8 {
            let h = h.clone();
            handles.push(tokio::spawn(async move {
                h.auth
                    .register(req("alice", &format!("alice{i}@x.com"), "Str0ng!Pass1"))
                    .await
            }));
        }

        let mut ok = 0;
        let mut dup = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(RegistrationError::DuplicateUsername) => dup += 1,
                Err(other) => panic!("unexpected registration error: {other:?}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(dup, 7);
        assert_eq!(h.users.len(), 1);
    }

    #[tokio::test]
    async fn other_users_token_cannot_delete_entry() {
        let h = setup();
        h.auth.register(req("alice", "a@x.com", "Str0ng!Pass1")).await.unwrap();
        h.auth.register(req("bob", "b@x.com", "B0b!sSecret9")).await.unwrap();
        let alice = login_principal(&h, "alice", "Str0ng!Pass1").await;
        let bob = login_principal(&h, "bob", "B0b!sSecret9").await;

        let repo = InMemoryContentRepository::new();
        let entry = repo
            .create_entry(
                &alice,
                NewBlogEntry {
                    title: "Hello".to_string(),
                    content: "World".to_string(),
                },
                h.clock.now(),
            )
            .await
            .unwrap();

        assert_eq!(repo.delete_entry(&bob, entry.id).await, Err(ContentError::Forbidden));
        assert_eq!(
            repo.update_entry(&bob, entry.id, BlogEntryUpdate::default(), h.clock.now()).await,
            Err(ContentError::Forbidden)
        );
        assert_eq!(repo.get_entry(entry.id).await.unwrap().entry, entry);

        repo.delete_entry(&alice, entry.id).await.unwrap();
        assert_eq!(repo.get_entry(entry.id).await, Err(ContentError::NotFound));
    }

    #[tokio::test]
    async fn opaque_token_resolves_to_same_user_as_self_signed() {
        let h = setup();
        let user = h.auth.register(req("alice", "a@x.com", "Str0ng!Pass1")).await.unwrap();

        let tokens = Arc::new(InMemoryAccessTokenStore::new());
        tokens.insert(AccessTokenRecord {
            token: "provider-issued-123".to_string(),
            user_id: user.id,
            expires_at: h.clock.now() + Duration::minutes(10),
            scope: "read write".to_string(),
        });
        let opaque = TokenValidator::opaque(tokens.clone(), h.users.clone(), 0);

        let via_opaque = opaque
            .validate("provider-issued-123", h.clock.now())
            .await
            .unwrap()
            .into_principal()
            .unwrap();
        let via_jwt = login_principal(&h, "alice", "Str0ng!Pass1").await;
        assert_eq!(via_opaque, via_jwt);

        tokens.revoke("provider-issued-123");
        assert_eq!(
            opaque.validate("provider-issued-123", h.clock.now()).await,
            Ok(AuthOutcome::Unauthenticated)
        );
    }
}
