mod common;

use common::{test_config, CountingStore, SIGNING_KEY};
use keeper_api::{
    auth::{JwtVerifier, TokenError, TokenIssuer, TokenVerifier},
    db::CredentialStore,
    utils::ErrorKind,
    AccessGate,
};
use std::sync::Arc;

/// Accepts exactly one token and maps it to a fixed username
struct StaticVerifier {
    token: &'static str,
    username: &'static str,
}

impl TokenVerifier for StaticVerifier {
    fn verify(&self, token: &str, _key: &str) -> Result<String, TokenError> {
        if token == self.token {
            Ok(self.username.to_string())
        } else {
            Err(TokenError::Invalid)
        }
    }
}

#[tokio::test]
async fn test_gate_uses_the_injected_verifier() {
    let store = CountingStore::new().await;
    let alice = store.register("alice", "digest").await.unwrap();

    let gate = AccessGate::new(
        store.clone(),
        Arc::new(StaticVerifier {
            token: "let-me-in",
            username: "alice",
        }),
        SIGNING_KEY,
    );

    let user = gate.authorize(Some("let-me-in")).await.unwrap();
    assert_eq!(user.user_id(), alice.id);
    assert_eq!(user.login(), "alice");

    let err = gate.authorize(Some("something-else")).await.unwrap_err();
    assert_eq!(err.error, ErrorKind::Authentication);
}

#[tokio::test]
async fn test_gate_rejects_missing_and_empty_tokens() {
    let store = CountingStore::new().await;
    let gate = AccessGate::new(store, Arc::new(JwtVerifier), SIGNING_KEY);

    assert_eq!(
        gate.authorize(None).await.unwrap_err().error,
        ErrorKind::Authentication
    );
    assert_eq!(
        gate.authorize(Some("")).await.unwrap_err().error,
        ErrorKind::Authentication
    );
}

#[tokio::test]
async fn test_gate_rejects_tokens_for_unknown_users() {
    let store = CountingStore::new().await;
    let gate = AccessGate::new(store, Arc::new(JwtVerifier), SIGNING_KEY);

    // Validly signed, but nobody called "ghost" ever registered
    let config = test_config();
    let issuer = TokenIssuer::new(&config.jwt.secret, chrono::Duration::hours(1));
    let token = issuer.issue("ghost").unwrap().token;

    assert_eq!(
        gate.authorize(Some(&token)).await.unwrap_err().error,
        ErrorKind::Authentication
    );
}

#[tokio::test]
async fn test_gate_rejects_tokens_signed_with_another_key() {
    let store = CountingStore::new().await;
    store.register("alice", "digest").await.unwrap();
    let gate = AccessGate::new(store, Arc::new(JwtVerifier), SIGNING_KEY);

    let foreign = TokenIssuer::new("some-other-key", chrono::Duration::hours(1))
        .issue("alice")
        .unwrap()
        .token;

    assert_eq!(
        gate.authorize(Some(&foreign)).await.unwrap_err().error,
        ErrorKind::Authentication
    );
}
