use async_trait::async_trait;
use shared::{Binary, Card, Credential, Record, RecordKind, Text};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
    Executor,
};
use std::str::FromStr;
use tracing::{debug, info};

use super::{schema, CredentialStore, StoreError, StoreResult, User};

type CardRow = (String, String, String, String, String, String);

/// SQLite-backed [`CredentialStore`]
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and apply the schema
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        info!("Connected to database at {}", url);
        Self::with_pool(pool).await
    }

    /// Private in-memory database, used by tests
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Every connection to :memory: is its own database, so pin exactly one
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> StoreResult<Self> {
        for statement in schema::MIGRATIONS {
            pool.execute(*statement).await?;
        }
        Ok(Self { pool })
    }
}

fn conflict_or(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn register(&self, login: &str, password_hash: &str) -> StoreResult<User> {
        let result = sqlx::query("INSERT INTO users (login, password) VALUES (?, ?)")
            .bind(login)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(conflict_or)?;

        let user = User {
            id: result.last_insert_rowid(),
            login: login.to_string(),
        };
        debug!(user_id = user.id, "Registered user");
        Ok(user)
    }

    async fn authenticate(&self, login: &str, password_hash: &str) -> StoreResult<User> {
        let row = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, login FROM users WHERE login = ? AND password = ?",
        )
        .bind(login)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(id, login)| User { id, login })
            .ok_or(StoreError::NotFound)
    }

    async fn user_by_login(&self, login: &str) -> StoreResult<User> {
        let row = sqlx::query_as::<_, (i64, String)>("SELECT id, login FROM users WHERE login = ?")
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(id, login)| User { id, login })
            .ok_or(StoreError::NotFound)
    }

    async fn add_record(&self, user_id: i64, record: &Record) -> StoreResult<()> {
        let query = match record {
            Record::Card(card) => sqlx::query(
                "INSERT INTO cards (user_id, id, fio, number, date, cvv, metainfo)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(user_id)
            .bind(&card.id)
            .bind(&card.fio)
            .bind(&card.number)
            .bind(&card.date)
            .bind(&card.cvv)
            .bind(&card.metainfo),
            Record::Credential(credential) => sqlx::query(
                "INSERT INTO logins (user_id, id, login, password, metainfo)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(user_id)
            .bind(&credential.id)
            .bind(&credential.login)
            .bind(&credential.password)
            .bind(&credential.metainfo),
            Record::Text(text) => sqlx::query(
                "INSERT INTO text_data (user_id, id, content, metainfo) VALUES (?, ?, ?, ?)",
            )
            .bind(user_id)
            .bind(&text.id)
            .bind(&text.content)
            .bind(&text.metainfo),
            Record::Binary(binary) => sqlx::query(
                "INSERT INTO bin_data (user_id, id, content, metainfo) VALUES (?, ?, ?, ?)",
            )
            .bind(user_id)
            .bind(&binary.id)
            .bind(&binary.data)
            .bind(&binary.metainfo),
        };

        query.execute(&self.pool).await.map_err(conflict_or)?;
        debug!(user_id, kind = %record.kind(), id = record.id(), "Stored record");
        Ok(())
    }

    async fn get_record(&self, kind: RecordKind, user_id: i64, id: &str) -> StoreResult<Record> {
        let record = match kind {
            RecordKind::Card => sqlx::query_as::<_, CardRow>(
                "SELECT id, fio, number, date, cvv, metainfo FROM cards \
                 WHERE user_id = ? AND id = ?",
            )
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|(id, fio, number, date, cvv, metainfo)| {
                Record::Card(Card {
                    id,
                    fio,
                    number,
                    date,
                    cvv,
                    metainfo,
                })
            }),
            RecordKind::Credential => sqlx::query_as::<_, (String, String, String, String)>(
                "SELECT id, login, password, metainfo FROM logins WHERE user_id = ? AND id = ?",
            )
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|(id, login, password, metainfo)| {
                Record::Credential(Credential {
                    id,
                    login,
                    password,
                    metainfo,
                })
            }),
            RecordKind::Text => sqlx::query_as::<_, (String, String, String)>(
                "SELECT id, content, metainfo FROM text_data WHERE user_id = ? AND id = ?",
            )
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|(id, content, metainfo)| {
                Record::Text(Text {
                    id,
                    content,
                    metainfo,
                })
            }),
            RecordKind::Binary => sqlx::query_as::<_, (String, Vec<u8>, String)>(
                "SELECT id, content, metainfo FROM bin_data WHERE user_id = ? AND id = ?",
            )
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|(id, data, metainfo)| Record::Binary(Binary { id, data, metainfo })),
        };

        record.ok_or(StoreError::NotFound)
    }

    async fn delete_record(&self, kind: RecordKind, user_id: i64, id: &str) -> StoreResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = ? AND id = ?",
            schema::table_for(kind)
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(user_id, %kind, id, removed = result.rows_affected(), "Deleted record");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
