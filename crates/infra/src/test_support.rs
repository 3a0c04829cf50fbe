//! Principals for tests, obtained the only way they can be: by validating a token.

use std::sync::Arc;

use chrono::Utc;

use quill_auth::{
    CredentialStore, NewUser, PasswordHash, Principal, SigningSecret, TokenConfig, TokenIssuer, TokenValidator,
};

use crate::credentials::InMemoryCredentialStore;

pub(crate) async fn principal_for(store: &Arc<InMemoryCredentialStore>, username: &str) -> Principal {
    let user = store
        .create(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: PasswordHash::from_phc("$argon2id$stub"),
        })
        .await
        .unwrap();

    let cfg = TokenConfig::new(SigningSecret::new("test-support").unwrap());
    let now = Utc::now();
    let token = TokenIssuer::new(&cfg).issue(&user, now).unwrap();
    TokenValidator::self_signed(&cfg, store.clone())
        .validate(&token.access_token, now)
        .await
        .unwrap()
        .into_principal()
        .unwrap()
}

pub(crate) async fn principal_pair() -> (Principal, Principal) {
    let store = Arc::new(InMemoryCredentialStore::new());
    (principal_for(&store, "alice").await, principal_for(&store, "bob").await)
}
