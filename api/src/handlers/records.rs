use crate::{middleware::AuthenticatedUser, utils::ApiResult, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::VaultRecord;

/// Store a new record owned by the caller
pub async fn add_record<R: VaultRecord>(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<R>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(record) = payload?;
    state.records.add(&user, record).await?;
    Ok(StatusCode::OK)
}

pub async fn get_record<R: VaultRecord>(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<R>> {
    let record = state.records.get::<R>(&user, &id).await?;
    Ok(Json(record))
}

pub async fn delete_record<R: VaultRecord>(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.records.delete::<R>(&user, &id).await?;
    Ok(StatusCode::OK)
}

/// `POST /api/<kind>` and `GET|DELETE /api/<kind>/:id`
pub fn routes<R: VaultRecord>() -> Router<AppState> {
    let segment = R::KIND.path_segment();

    Router::new()
        .route(&format!("/api/{}", segment), post(add_record::<R>))
        .route(
            &format!("/api/{}/:id", segment),
            get(get_record::<R>).delete(delete_record::<R>),
        )
}
