use crate::{
    auth::TokenVerifier,
    db::{CredentialStore, StoreError},
    state::AppState,
    utils::{ApiError, ApiResult},
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
    Json,
};
use std::sync::Arc;
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};
use tracing::{debug, warn};

/// Identity of the caller of a protected operation.
///
/// Only [`AccessGate::authorize`] can produce one, so a handler that takes it
/// as an argument cannot run for an unauthenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: i64,
    login: String,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn login(&self) -> &str {
        &self.login
    }
}

/// Resolves a presented session token to a live user
#[derive(Clone)]
pub struct AccessGate {
    store: Arc<dyn CredentialStore>,
    verifier: Arc<dyn TokenVerifier>,
    signing_key: Arc<str>,
}

impl AccessGate {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        verifier: Arc<dyn TokenVerifier>,
        signing_key: &str,
    ) -> Self {
        Self {
            store,
            verifier,
            signing_key: Arc::from(signing_key),
        }
    }

    /// Missing token, failed verification and unknown user all reject with
    /// an authentication error; only a storage failure is internal.
    pub async fn authorize(&self, token: Option<&str>) -> ApiResult<AuthenticatedUser> {
        let token = token.filter(|t| !t.is_empty()).ok_or_else(|| {
            debug!("Request without bearer token");
            ApiError::authentication_error("Authentication required")
        })?;

        let username = self.verifier.verify(token, &self.signing_key).map_err(|e| {
            warn!("Rejected session token: {}", e);
            ApiError::authentication_error("Invalid or expired token")
        })?;

        match self.store.user_by_login(&username).await {
            Ok(user) => Ok(AuthenticatedUser {
                user_id: user.id,
                login: user.login,
            }),
            Err(StoreError::NotFound) => {
                warn!("Session token names a user that no longer exists");
                Err(ApiError::authentication_error("Invalid or expired token"))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Extract authentication from request headers
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|auth_header| auth_header.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

/// Authentication middleware for protected routes
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers());
    let user = state.gate.authorize(token.as_deref()).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::authentication_error("Authentication required"))
    }
}

/// Request ID middleware
pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Tracing middleware
pub fn trace_layer() -> tower_http::trace::TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
> {
    tower_http::trace::TraceLayer::new_for_http()
        .make_span_with(tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO))
        .on_response(tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO))
}

/// Health check handler
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert("Authorization", HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
