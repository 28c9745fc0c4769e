pub mod password;
pub mod token;

use crate::{
    db::{CredentialStore, StoreError},
    utils::{ApiError, ApiResult},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

pub use password::hash_password;
pub use token::{Claims, IssuedToken, JwtVerifier, TokenError, TokenIssuer, TokenVerifier};

/// Outcome of a successful register or sign-in
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    issuer: TokenIssuer,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, issuer: TokenIssuer) -> Self {
        Self { store, issuer }
    }

    /// Create a user and open a session for it
    pub async fn register(&self, login: &str, password: &str) -> ApiResult<Session> {
        validate_credentials(login, password)?;

        let user = self
            .store
            .register(login, &hash_password(password))
            .await
            .map_err(|e| match e {
                StoreError::Conflict => ApiError::conflict_error("login is already taken"),
                other => other.into(),
            })?;

        info!(user_id = user.id, "User registered");
        self.open_session(user.id, &user.login)
    }

    /// Authenticate with login and password and open a session
    pub async fn sign_in(&self, login: &str, password: &str) -> ApiResult<Session> {
        validate_credentials(login, password)?;

        let user = self
            .store
            .authenticate(login, &hash_password(password))
            .await
            .map_err(|e| match e {
                StoreError::NotFound => {
                    warn!("Rejected sign-in attempt");
                    ApiError::authentication_error("invalid login or password")
                }
                other => other.into(),
            })?;

        info!(user_id = user.id, "User signed in");
        self.open_session(user.id, &user.login)
    }

    fn open_session(&self, user_id: i64, login: &str) -> ApiResult<Session> {
        let IssuedToken { token, expires_at } = self
            .issuer
            .issue(login)
            .map_err(|_| ApiError::internal_error("Failed to generate token"))?;

        Ok(Session {
            user_id,
            token,
            expires_at,
        })
    }
}

fn validate_credentials(login: &str, password: &str) -> ApiResult<()> {
    if login.is_empty() {
        return Err(ApiError::validation_error("login must not be empty"));
    }
    if password.is_empty() {
        return Err(ApiError::validation_error("password must not be empty"));
    }
    Ok(())
}
