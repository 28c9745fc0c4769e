pub mod schema;
pub mod sqlite;

use async_trait::async_trait;
use shared::{Record, RecordKind};
use thiserror::Error;

pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("already exists")]
    Conflict,
    #[error("not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub login: String,
}

/// Persistence for users and their records.
///
/// Failed operations leave the store unchanged. `delete_record` succeeds when
/// there is nothing to delete.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create a user; `Conflict` when the login is taken
    async fn register(&self, login: &str, password_hash: &str) -> StoreResult<User>;

    /// Exact match on login and digest
    async fn authenticate(&self, login: &str, password_hash: &str) -> StoreResult<User>;

    async fn user_by_login(&self, login: &str) -> StoreResult<User>;

    /// `Conflict` when the user already has a record of this kind with this id
    async fn add_record(&self, user_id: i64, record: &Record) -> StoreResult<()>;

    async fn get_record(&self, kind: RecordKind, user_id: i64, id: &str) -> StoreResult<Record>;

    async fn delete_record(&self, kind: RecordKind, user_id: i64, id: &str) -> StoreResult<()>;

    async fn close(&self);
}
