use crate::secret::credentials_match;
use async_trait::async_trait;
use burrow_core::error::{Result, StorageError};
use burrow_core::{Credential, LinkRecord, LinkStore, ReadLinkStore, Token};
use jiff::Timestamp;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, trace};

const SCHEMA: &str = include_str!("../ddl/sqlite/links.sql");

/// SQLite implementation of the link store contract.
///
/// Soft delete is implemented with `deleted_at`. Reads only return live rows
/// (`deleted_at IS NULL`). Token and credential uniqueness among live rows is
/// enforced by partial unique indexes, so concurrent inserts are arbitrated
/// by the database engine itself.
#[derive(Debug, Clone)]
pub struct SqliteLinkStore {
    pool: SqlitePool,
}

impl SqliteLinkStore {
    /// Creates a store from an existing pool. The schema must already exist;
    /// call [`migrate`](Self::migrate) otherwise.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database file at `path` and applies
    /// the schema.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        Self::connect_with(Self::pool_options(), options).await
    }

    /// Opens a private in-memory database, mostly useful for tests.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new().in_memory(true);
        // The database lives and dies with its only connection, which must
        // therefore never be reaped.
        let pool_options = Self::pool_options()
            .idle_timeout(None)
            .max_lifetime(None);
        Self::connect_with(pool_options, options).await
    }

    // One connection: SQLite serializes writers anyway.
    fn pool_options() -> SqlitePoolOptions {
        SqlitePoolOptions::new().max_connections(1)
    }

    async fn connect_with(
        pool_options: SqlitePoolOptions,
        options: SqliteConnectOptions,
    ) -> Result<Self> {
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Applies the schema. Idempotent.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("sqlite link schema is up to date");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn now_unix_seconds() -> i64 {
    Timestamp::now().as_second()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadLinkStore for SqliteLinkStore {
    async fn get(&self, token: &Token) -> Result<Option<LinkRecord>> {
        let row = sqlx::query(
            r#"
            SELECT target, credential
            FROM links
            WHERE token = ?
              AND deleted_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            trace!(token = %token, "no live row");
            return Ok(None);
        };

        let target: String = row.try_get("target").map_err(map_sqlx_error)?;
        let credential: String = row.try_get("credential").map_err(map_sqlx_error)?;

        Ok(Some(LinkRecord {
            target,
            token: token.clone(),
            credential: Credential::new(credential),
        }))
    }
}

#[async_trait]
impl LinkStore for SqliteLinkStore {
    async fn put(&self, record: &LinkRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO links (target, token, credential, created_at, deleted_at)
            VALUES (?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&record.target)
        .bind(record.token.as_str())
        .bind(record.credential.as_str())
        .bind(now_unix_seconds())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                trace!(token = %record.token, "inserted link row");
                Ok(())
            }
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(record.token.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn delete(&self, token: &Token, credential: &Credential) -> Result<()> {
        // Dropping the transaction without commit rolls it back, so an
        // abandoned request cannot leave a half-applied delete.
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query(
            r#"
            SELECT id, credential
            FROM links
            WHERE token = ?
              AND deleted_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Err(StorageError::NotFound(token.to_string()));
        };

        let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
        let stored: String = row.try_get("credential").map_err(map_sqlx_error)?;
        if !credentials_match(stored.as_bytes(), credential.as_bytes()) {
            return Err(StorageError::Unauthorized(token.to_string()));
        }

        let result = sqlx::query(
            r#"
            UPDATE links
            SET deleted_at = ?
            WHERE id = ?
              AND deleted_at IS NULL
            "#,
        )
        .bind(now_unix_seconds())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(token.to_string()));
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        trace!(token = %token, "soft-deleted link row");
        Ok(())
    }
}
