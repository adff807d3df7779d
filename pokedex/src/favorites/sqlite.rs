//! `SqliteFavoritesBackend` - On-Device Storage
//!
//! `TigerStyle`: Real database storage, one long-lived connection.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS favorites (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     pokemon_id INTEGER UNIQUE NOT NULL,
//!     added_at INTEGER NOT NULL   -- Unix milliseconds
//! );
//! CREATE INDEX IF NOT EXISTS idx_favorites_added_at
//!     ON favorites(added_at DESC, id DESC);
//! ```
//!
//! Schema creation runs on every open and is idempotent.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};

use super::backend::FavoritesBackend;
use super::error::{StorageError, StorageResult};
use super::record::FavoriteRecord;
use crate::constants::FAVORITES_DB_CONNECTIONS_COUNT;

const INSERT_SQL: &str = "INSERT OR IGNORE INTO favorites (pokemon_id, added_at) VALUES (?, ?)";
const DELETE_SQL: &str = "DELETE FROM favorites WHERE pokemon_id = ?";

// =============================================================================
// SqliteFavoritesBackend
// =============================================================================

/// SQLite favorites backend for production use.
///
/// The pool holds exactly one connection that is opened once and never
/// recycled, so an in-memory database lives as long as the backend.
#[derive(Clone, Debug)]
pub struct SqliteFavoritesBackend {
    pool: SqlitePool,
}

impl SqliteFavoritesBackend {
    /// Open (creating if missing) the database file at `path`.
    ///
    /// # Errors
    /// Returns `StorageError::Open` if `path` is empty, the file cannot be
    /// opened or the schema cannot be created.
    ///
    /// # Example
    /// ```ignore
    /// let backend = SqliteFavoritesBackend::open("pokedex.db").await?;
    /// ```
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(StorageError::open("database path cannot be empty"));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        tracing::debug!(path = %path.display(), "opening favorites database");
        Self::connect(options).await
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns `StorageError::Open` if SQLite cannot be initialized.
    pub async fn open_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StorageError::open(format!("invalid in-memory options: {e}")))?;
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> StorageResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(FAVORITES_DB_CONNECTIONS_COUNT)
            .min_connections(FAVORITES_DB_CONNECTIONS_COUNT)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::open(format!("failed to open database: {e}")))?;

        let backend = Self { pool };
        backend.init_schema().await?;
        Ok(backend)
    }

    /// Create the favorites table and its ordering index.
    async fn init_schema(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS favorites (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                pokemon_id INTEGER UNIQUE NOT NULL,
                added_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::open(format!("failed to create favorites table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_favorites_added_at ON favorites(added_at DESC, id DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::open(format!("failed to create favorites index: {e}")))?;

        Ok(())
    }

    /// Close the connection. Later operations fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn insert_in(tx: &mut Transaction<'_, Sqlite>, pokemon_id: u32) -> StorageResult<bool> {
        let result = sqlx::query(INSERT_SQL)
            .bind(i64::from(pokemon_id))
            .bind(Utc::now().timestamp_millis())
            .execute(&mut **tx)
            .await
            .map_err(|e| StorageError::write(format!("failed to insert favorite: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_in(tx: &mut Transaction<'_, Sqlite>, pokemon_id: u32) -> StorageResult<bool> {
        let result = sqlx::query(DELETE_SQL)
            .bind(i64::from(pokemon_id))
            .execute(&mut **tx)
            .await
            .map_err(|e| StorageError::write(format!("failed to delete favorite: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    async fn begin(&self) -> StorageResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| StorageError::write(format!("failed to begin transaction: {e}")))
    }

    async fn commit(tx: Transaction<'_, Sqlite>) -> StorageResult<()> {
        tx.commit()
            .await
            .map_err(|e| StorageError::write(format!("failed to commit: {e}")))
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

fn row_to_record(row: &SqliteRow) -> StorageResult<FavoriteRecord> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| StorageError::corrupted(e.to_string()))?;

    let raw_pokemon_id: i64 = row
        .try_get("pokemon_id")
        .map_err(|e| StorageError::corrupted(e.to_string()))?;
    let pokemon_id = u32::try_from(raw_pokemon_id)
        .ok()
        .filter(|pokemon_id| *pokemon_id > 0)
        .ok_or_else(|| StorageError::corrupted(format!("invalid pokemon_id: {raw_pokemon_id}")))?;

    let added_at_ms: i64 = row
        .try_get("added_at")
        .map_err(|e| StorageError::corrupted(e.to_string()))?;
    let added_at: DateTime<Utc> = DateTime::from_timestamp_millis(added_at_ms)
        .ok_or_else(|| StorageError::corrupted(format!("invalid added_at: {added_at_ms}")))?;

    Ok(FavoriteRecord {
        id,
        pokemon_id,
        added_at,
    })
}

// =============================================================================
// FavoritesBackend Implementation
// =============================================================================

#[async_trait]
impl FavoritesBackend for SqliteFavoritesBackend {
    #[tracing::instrument(skip(self))]
    async fn insert(&self, pokemon_id: u32) -> StorageResult<bool> {
        let result = sqlx::query(INSERT_SQL)
            .bind(i64::from(pokemon_id))
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::write(format!("failed to insert favorite: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, pokemon_id: u32) -> StorageResult<bool> {
        let result = sqlx::query(DELETE_SQL)
            .bind(i64::from(pokemon_id))
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::write(format!("failed to delete favorite: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn toggle(&self, pokemon_id: u32) -> StorageResult<bool> {
        let mut tx = self.begin().await?;

        let now_favorite = if Self::delete_in(&mut tx, pokemon_id).await? {
            false
        } else {
            let inserted = Self::insert_in(&mut tx, pokemon_id).await?;
            // Postcondition
            assert!(inserted, "absent id must insert inside the transaction");
            true
        };

        Self::commit(tx).await?;
        Ok(now_favorite)
    }

    async fn contains(&self, pokemon_id: u32) -> StorageResult<bool> {
        let row = sqlx::query("SELECT id FROM favorites WHERE pokemon_id = ?")
            .bind(i64::from(pokemon_id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::read(format!("failed to check favorite: {e}")))?;

        Ok(row.is_some())
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self) -> StorageResult<Vec<FavoriteRecord>> {
        let rows = sqlx::query(
            "SELECT id, pokemon_id, added_at FROM favorites ORDER BY added_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::read(format!("failed to list favorites: {e}")))?;

        rows.iter().map(row_to_record).collect()
    }

    async fn count(&self) -> StorageResult<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM favorites")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::read(format!("failed to count favorites: {e}")))?;

        let count: i64 = row
            .try_get("count")
            .map_err(|e| StorageError::corrupted(e.to_string()))?;
        usize::try_from(count).map_err(|_| StorageError::corrupted(format!("invalid count: {count}")))
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pokemon_ids(backend: &SqliteFavoritesBackend) -> Vec<u32> {
        backend
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.pokemon_id)
            .collect()
    }

    #[tokio::test]
    async fn test_insert_or_ignore() {
        let backend = SqliteFavoritesBackend::open_in_memory().await.unwrap();

        assert!(backend.insert(25).await.unwrap());
        assert!(!backend.insert(25).await.unwrap());

        assert_eq!(backend.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_toggle_transaction() {
        let backend = SqliteFavoritesBackend::open_in_memory().await.unwrap();

        assert!(backend.toggle(4).await.unwrap());
        assert!(backend.contains(4).await.unwrap());
        assert!(!backend.toggle(4).await.unwrap());
        assert!(!backend.contains(4).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let backend = SqliteFavoritesBackend::open_in_memory().await.unwrap();

        for id in [3, 1, 4] {
            backend.insert(id).await.unwrap();
        }

        // Inserts within one millisecond tie on added_at and fall back to id
        assert_eq!(pokemon_ids(&backend).await, vec![4, 1, 3]);
    }

    #[tokio::test]
    async fn test_delete_absent() {
        let backend = SqliteFavoritesBackend::open_in_memory().await.unwrap();

        assert!(!backend.delete(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.db");

        let backend = SqliteFavoritesBackend::open(&path).await.unwrap();
        backend.insert(1).await.unwrap();
        backend.insert(25).await.unwrap();
        backend.close().await;

        // Schema creation is idempotent on reopen
        let reopened = SqliteFavoritesBackend::open(&path).await.unwrap();
        assert_eq!(pokemon_ids(&reopened).await, vec![25, 1]);
    }

    #[tokio::test]
    async fn test_empty_path_is_open_error() {
        let err = SqliteFavoritesBackend::open("").await.unwrap_err();
        assert!(matches!(err, StorageError::Open { .. }));
    }

    #[tokio::test]
    async fn test_closed_backend_errors() {
        let backend = SqliteFavoritesBackend::open_in_memory().await.unwrap();
        backend.close().await;

        let err = backend.list().await.unwrap_err();
        assert!(matches!(err, StorageError::Read { .. }));
    }
}
