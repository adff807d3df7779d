//! `FavoritesBackend` Trait
//!
//! `TigerStyle`: Abstract storage with simulation-first testing.

use async_trait::async_trait;

use super::error::StorageResult;
use super::record::FavoriteRecord;

/// Storage backend for the favorites table.
///
/// Every method is a short, independent transaction. Implementations:
/// - `SimFavoritesBackend`: in-memory with fault injection (testing)
/// - `SqliteFavoritesBackend`: on-device SQLite (production)
///
/// Ids are validated by the caller; backends may assume they are positive.
#[async_trait]
pub trait FavoritesBackend: Send + Sync + std::fmt::Debug {
    /// Insert a favorite if absent.
    ///
    /// Returns `true` if a record was created, `false` if it already existed.
    async fn insert(&self, pokemon_id: u32) -> StorageResult<bool>;

    /// Delete a favorite if present.
    ///
    /// Returns `true` if a record was removed.
    async fn delete(&self, pokemon_id: u32) -> StorageResult<bool>;

    /// Atomically invert membership.
    ///
    /// Returns `true` if the id is a favorite afterwards.
    async fn toggle(&self, pokemon_id: u32) -> StorageResult<bool>;

    /// Check membership.
    async fn contains(&self, pokemon_id: u32) -> StorageResult<bool>;

    /// All records, most recent first, ties broken by surrogate key descending.
    async fn list(&self) -> StorageResult<Vec<FavoriteRecord>>;

    /// Number of stored favorites.
    async fn count(&self) -> StorageResult<usize>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}
