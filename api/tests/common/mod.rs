#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, Method, StatusCode},
    Router,
};
use keeper_api::{
    auth::JwtVerifier,
    create_app,
    db::{CredentialStore, SqliteStore, StoreError, StoreResult, User},
    AppState, Config,
};
use serde_json::Value;
use shared::{Record, RecordKind};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};
use tower::ServiceExt;

pub const SIGNING_KEY: &str = "test-signing-key-for-testing-only";

pub fn test_config() -> Arc<Config> {
    test_config_with(&[])
}

/// Test configuration with some variables overridden
pub fn test_config_with(overrides: &[(&str, &str)]) -> Arc<Config> {
    let mut vars: HashMap<&str, &str> = [("SIGNING_KEY", SIGNING_KEY), ("PORT", "0")]
        .into_iter()
        .collect();
    vars.extend(overrides.iter().copied());
    Arc::new(Config::from_vars(|name| vars.get(name).map(|v| v.to_string())).unwrap())
}

/// Wraps a real store, counting record operations and optionally pretending
/// that every user has vanished.
pub struct CountingStore {
    inner: SqliteStore,
    record_ops: AtomicUsize,
    hide_users: AtomicBool,
}

impl CountingStore {
    pub async fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: SqliteStore::in_memory().await.unwrap(),
            record_ops: AtomicUsize::new(0),
            hide_users: AtomicBool::new(false),
        })
    }

    pub fn record_ops(&self) -> usize {
        self.record_ops.load(Ordering::SeqCst)
    }

    pub fn hide_users(&self) {
        self.hide_users.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialStore for CountingStore {
    async fn register(&self, login: &str, password_hash: &str) -> StoreResult<User> {
        self.inner.register(login, password_hash).await
    }

    async fn authenticate(&self, login: &str, password_hash: &str) -> StoreResult<User> {
        self.inner.authenticate(login, password_hash).await
    }

    async fn user_by_login(&self, login: &str) -> StoreResult<User> {
        if self.hide_users.load(Ordering::SeqCst) {
            return Err(StoreError::NotFound);
        }
        self.inner.user_by_login(login).await
    }

    async fn add_record(&self, user_id: i64, record: &Record) -> StoreResult<()> {
        self.record_ops.fetch_add(1, Ordering::SeqCst);
        self.inner.add_record(user_id, record).await
    }

    async fn get_record(&self, kind: RecordKind, user_id: i64, id: &str) -> StoreResult<Record> {
        self.record_ops.fetch_add(1, Ordering::SeqCst);
        self.inner.get_record(kind, user_id, id).await
    }

    async fn delete_record(&self, kind: RecordKind, user_id: i64, id: &str) -> StoreResult<()> {
        self.record_ops.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_record(kind, user_id, id).await
    }

    async fn close(&self) {
        self.inner.close().await
    }
}

pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<CountingStore>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Arc<Config>) -> Self {
        let store = CountingStore::new().await;
        let state = AppState::new(store.clone(), Arc::new(JwtVerifier), config);

        Self {
            app: create_app(state.clone()),
            state,
            store,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut request = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };

        (status, headers, json)
    }
}

/// Token carried by the `Authorization` response header
pub fn bearer_from(headers: &HeaderMap) -> String {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
        .expect("response carries a bearer token")
}
