pub mod auth;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod rpc;
pub mod service;
pub mod state;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use handlers::{auth as auth_handlers, records};
use middleware::{health_check, request_id_layer, require_auth, trace_layer};
use shared::{Binary, Card, Credential, Text};
use tower::ServiceBuilder;

pub use auth::AuthService;
pub use db::{CredentialStore, SqliteStore};
pub use middleware::{AccessGate, AuthenticatedUser};
pub use rpc::RpcServer;
pub use state::AppState;
pub use utils::{ApiError, ApiResult, Config};

/// Build the REST router
pub fn create_app(state: AppState) -> Router {
    // Create public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/register", post(auth_handlers::register))
        .route("/api/signin", post(auth_handlers::sign_in));

    // Create protected routes (auth required)
    let protected_routes = Router::new()
        .merge(records::routes::<Card>())
        .merge(records::routes::<Credential>())
        .merge(records::routes::<Text>())
        .merge(records::routes::<Binary>())
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let max_body_size = state.config.server.max_body_size;

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                // Request tracing
                .layer(trace_layer())
                // Request ID
                .layer(request_id_layer())
                // Body size limit
                .layer(DefaultBodyLimit::max(max_body_size)),
        )
        .with_state(state)
}
