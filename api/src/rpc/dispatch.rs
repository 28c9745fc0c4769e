use crate::{
    middleware::AuthenticatedUser,
    state::AppState,
    utils::{ApiError, ApiResult},
};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use shared::{
    rpc::{INVALID_REQUEST, METHOD_NOT_FOUND},
    Binary, Card, Credential, JsonRpcRequest, JsonRpcResponse, RecordIdParams, RecordKind,
    RpcMethod, RpcStatus, SessionParams, SessionReply, Text, UserCredentials, VaultRecord,
};
use tracing::{debug, warn};

/// Run `$func::<T>(args)` for the record type matching `$kind`
macro_rules! with_record_type {
    ($kind:expr, $func:ident($($arg:expr),*)) => {
        match $kind {
            RecordKind::Card => $func::<Card>($($arg),*).await,
            RecordKind::Credential => $func::<Credential>($($arg),*).await,
            RecordKind::Text => $func::<Text>($($arg),*).await,
            RecordKind::Binary => $func::<Binary>($($arg),*).await,
        }
    };
}

/// Parse and dispatch a single JSON-RPC request frame
pub async fn process_request(state: &AppState, raw: &[u8]) -> JsonRpcResponse {
    let request: JsonRpcRequest = match serde_json::from_slice(raw) {
        Ok(req) => req,
        Err(e) => return JsonRpcResponse::parse_error(format!("Parse error: {}", e)),
    };

    if let Err(e) = request.validate() {
        return JsonRpcResponse::error(request.id, INVALID_REQUEST, e);
    }

    let Some(method) = RpcMethod::parse(&request.method) else {
        return JsonRpcResponse::error(
            request.id,
            METHOD_NOT_FOUND,
            format!("Unknown method: {}", request.method),
        );
    };

    debug!(method = %request.method, "RPC call");
    match dispatch(state, method, request.params).await {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(err) => JsonRpcResponse::status(request.id, RpcStatus::from(&err), err.message),
    }
}

async fn dispatch(state: &AppState, method: RpcMethod, params: Value) -> ApiResult<Value> {
    match method {
        RpcMethod::Register => {
            let creds: UserCredentials = parse_params(params)?;
            let session = state
                .auth_service
                .register(&creds.login, &creds.password)
                .await?;
            to_value(SessionReply {
                user: session.user_id,
                token: session.token,
            })
        }
        RpcMethod::SignIn => {
            let creds: UserCredentials = parse_params(params)?;
            let session = state
                .auth_service
                .sign_in(&creds.login, &creds.password)
                .await?;
            to_value(SessionReply {
                user: session.user_id,
                token: session.token,
            })
        }
        RpcMethod::Add(kind) => {
            let user = authorize(state, &params).await?;
            with_record_type!(kind, add_record(state, &user, params))
        }
        RpcMethod::Get(kind) => {
            let user = authorize(state, &params).await?;
            with_record_type!(kind, get_record(state, &user, params))
        }
        RpcMethod::Delete(kind) => {
            let user = authorize(state, &params).await?;
            with_record_type!(kind, delete_record(state, &user, params))
        }
    }
}

/// Both the declared `user` and the session `token` must be present, and the
/// token must resolve to that same user.
async fn authorize(state: &AppState, params: &Value) -> ApiResult<AuthenticatedUser> {
    let session: SessionParams = serde_json::from_value(params.clone()).unwrap_or_default();
    if session.user == 0 || session.token.is_empty() {
        return Err(ApiError::authentication_error("Authentication required"));
    }

    let user = state.gate.authorize(Some(&session.token)).await?;
    if user.user_id() != session.user {
        warn!(
            declared = session.user,
            actual = user.user_id(),
            "Session token does not belong to the declared user"
        );
        return Err(ApiError::authentication_error("Invalid or expired token"));
    }

    Ok(user)
}

async fn add_record<R: VaultRecord>(
    state: &AppState,
    user: &AuthenticatedUser,
    mut params: Value,
) -> ApiResult<Value> {
    let field = R::KIND.rpc_field();
    let payload = params
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| ApiError::validation_error(format!("missing `{}` field", field)))?;

    let record: R = parse_params(payload)?;
    state.records.add(user, record).await?;
    Ok(json!({}))
}

async fn get_record<R: VaultRecord>(
    state: &AppState,
    user: &AuthenticatedUser,
    params: Value,
) -> ApiResult<Value> {
    let RecordIdParams { id, .. } = parse_params(params)?;
    let record = state.records.get::<R>(user, &id).await?;

    let mut result = Map::new();
    result.insert(R::KIND.rpc_field().to_string(), to_value(record)?);
    Ok(Value::Object(result))
}

async fn delete_record<R: VaultRecord>(
    state: &AppState,
    user: &AuthenticatedUser,
    params: Value,
) -> ApiResult<Value> {
    let RecordIdParams { id, .. } = parse_params(params)?;
    state.records.delete::<R>(user, &id).await?;
    Ok(json!({}))
}

fn parse_params<T: DeserializeOwned>(params: Value) -> ApiResult<T> {
    serde_json::from_value(params)
        .map_err(|e| ApiError::validation_error(format!("Invalid params: {}", e)))
}

fn to_value<T: serde::Serialize>(value: T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!("Failed to encode RPC result: {}", e);
        ApiError::internal_error("Internal server error")
    })
}
