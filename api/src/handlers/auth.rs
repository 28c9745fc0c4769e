use crate::{auth::Session, utils::ApiResult, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use shared::{AuthResponse, UserCredentials};

/// Handle user registration
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<UserCredentials>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;

    let session = state
        .auth_service
        .register(&request.login, &request.password)
        .await?;

    Ok(session_response(session))
}

/// Handle user sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<UserCredentials>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;

    let session = state
        .auth_service
        .sign_in(&request.login, &request.password)
        .await?;

    Ok(session_response(session))
}

fn session_response(session: Session) -> impl IntoResponse {
    (
        [(header::AUTHORIZATION, format!("Bearer {}", session.token))],
        Json(AuthResponse {
            token: session.token,
            expires_at: session.expires_at,
        }),
    )
}
