//! FavoritesStore - Durable Favorites Front
//!
//! TigerStyle: One explicitly constructed store per process, shared by `Arc`.
//!
//! # Guarantees
//!
//! - The backend is opened lazily on first use. Concurrent first use
//!   converges on a single open; a failed open is not cached.
//! - Mutations on the same id are serialized. Different ids proceed
//!   independently.
//! - A mutation, once issued, runs to completion on a spawned task even if
//!   the caller stops waiting for it.
//! - Every mutation that changes persisted state is announced on a
//!   broadcast channel.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::BoxFuture;
use tokio::sync::{broadcast, OnceCell};

use super::backend::FavoritesBackend;
use super::error::{StorageError, StorageResult};
use super::record::{validate_pokemon_id, FavoriteEvent, FavoriteRecord};
use super::sim::SimFavoritesBackend;
use crate::constants::FAVORITES_EVENT_CHANNEL_COUNT_MAX;
use crate::dst::SimConfig;

type SharedBackend = Arc<dyn FavoritesBackend>;
type Opener = Arc<dyn Fn() -> BoxFuture<'static, StorageResult<SharedBackend>> + Send + Sync>;
type IdLock = Arc<tokio::sync::Mutex<()>>;
type IdLocks = Arc<Mutex<HashMap<u32, IdLock>>>;

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Add,
    Remove,
    Toggle,
}

// =============================================================================
// FavoritesStore
// =============================================================================

/// The durable set of favorited Pokémon ids.
///
/// # Example
///
/// ```rust
/// use pokedex::favorites::FavoritesStore;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), pokedex::favorites::StorageError> {
/// let store = FavoritesStore::sim(42);
///
/// store.add(25).await?;
/// store.add(1).await?;
/// assert_eq!(store.list().await?, vec![1, 25]);
///
/// assert!(!store.toggle(25).await?);
/// assert_eq!(store.list().await?, vec![1]);
/// # Ok(())
/// # }
/// ```
pub struct FavoritesStore {
    backend: OnceCell<SharedBackend>,
    opener: Opener,
    locks: IdLocks,
    events: broadcast::Sender<FavoriteEvent>,
}

impl FavoritesStore {
    /// Create a store over an already opened backend.
    #[must_use]
    pub fn new(backend: impl FavoritesBackend + 'static) -> Self {
        let backend: SharedBackend = Arc::new(backend);
        let reopen = Arc::clone(&backend);
        let opener: Opener = Arc::new(move || {
            let backend = Arc::clone(&reopen);
            Box::pin(async move { Ok(backend) })
        });

        Self::with_parts(OnceCell::new_with(Some(backend)), opener)
    }

    /// Create a store that opens its backend on first use.
    ///
    /// `open` runs at most once concurrently; if it fails, the next
    /// operation calls it again.
    #[must_use]
    pub fn lazy<F, Fut, B>(open: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StorageResult<B>> + Send + 'static,
        B: FavoritesBackend + 'static,
    {
        let opener: Opener = Arc::new(move || {
            let opening = open();
            Box::pin(async move {
                let backend = opening.await?;
                Ok(Arc::new(backend) as SharedBackend)
            })
        });

        Self::with_parts(OnceCell::new(), opener)
    }

    /// Create a store over a fresh simulated backend.
    #[must_use]
    pub fn sim(seed: u64) -> Self {
        Self::new(SimFavoritesBackend::new(SimConfig::with_seed(seed)))
    }

    /// Create a store over the SQLite database at `path`, opened lazily.
    #[cfg(feature = "sqlite")]
    #[must_use]
    pub fn sqlite(path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        Self::lazy(move || {
            let path = path.clone();
            async move { super::sqlite::SqliteFavoritesBackend::open(path).await }
        })
    }

    fn with_parts(backend: OnceCell<SharedBackend>, opener: Opener) -> Self {
        let (events, _) = broadcast::channel(FAVORITES_EVENT_CHANNEL_COUNT_MAX);
        Self {
            backend,
            opener,
            locks: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open the backend now instead of on first use.
    ///
    /// # Errors
    /// Returns the open error; a later call retries.
    pub async fn open(&self) -> StorageResult<()> {
        self.backend().await.map(|_| ())
    }

    /// Whether the backend has been opened.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.backend.initialized()
    }

    async fn backend(&self) -> StorageResult<SharedBackend> {
        let backend = self
            .backend
            .get_or_try_init(|| {
                tracing::debug!("opening favorites backend");
                (self.opener)()
            })
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "favorites backend failed to open");
                e
            })?;
        Ok(Arc::clone(backend))
    }

    /// Subscribe to changes of the persisted set.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FavoriteEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Make `pokemon_id` a favorite. Adding an existing favorite is a no-op.
    ///
    /// # Errors
    /// Returns `StorageError::Validation` for id 0, or the backend error.
    #[tracing::instrument(skip(self))]
    pub async fn add(&self, pokemon_id: u32) -> StorageResult<()> {
        self.mutate(pokemon_id, Mutation::Add).await.map(|_| ())
    }

    /// Stop `pokemon_id` being a favorite. Removing an absent id is a no-op.
    ///
    /// # Errors
    /// Returns `StorageError::Validation` for id 0, or the backend error.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, pokemon_id: u32) -> StorageResult<()> {
        self.mutate(pokemon_id, Mutation::Remove).await.map(|_| ())
    }

    /// Invert membership of `pokemon_id`.
    ///
    /// Returns `true` if it is a favorite afterwards.
    ///
    /// # Errors
    /// Returns `StorageError::Validation` for id 0, or the backend error.
    #[tracing::instrument(skip(self))]
    pub async fn toggle(&self, pokemon_id: u32) -> StorageResult<bool> {
        self.mutate(pokemon_id, Mutation::Toggle).await
    }

    async fn mutate(&self, pokemon_id: u32, mutation: Mutation) -> StorageResult<bool> {
        validate_pokemon_id(pokemon_id)?;
        let backend = self.backend().await?;
        let lock = acquire_id_lock(&self.locks, pokemon_id);
        let locks = Arc::clone(&self.locks);
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            let guard = Arc::clone(&lock).lock_owned().await;
            let outcome = apply(backend.as_ref(), pokemon_id, mutation).await;
            // Sent under the guard: events for one id follow commit order
            let result = outcome.map(|(now_favorite, event)| {
                if let Some(event) = event {
                    // No subscribers is fine
                    let _ = events.send(event);
                }
                now_favorite
            });
            drop(guard);
            release_id_lock(&locks, pokemon_id, &lock);
            result
        });

        task.await
            .map_err(|e| StorageError::interrupted(format!("favorites mutation task: {e}")))?
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Favorited ids, most recent first (ties: later insert first).
    ///
    /// # Errors
    /// Returns the backend error.
    pub async fn list(&self) -> StorageResult<Vec<u32>> {
        let records = self.records().await?;
        Ok(records.into_iter().map(|r| r.pokemon_id).collect())
    }

    /// Full favorite records in `list` order.
    ///
    /// # Errors
    /// Returns the backend error.
    pub async fn records(&self) -> StorageResult<Vec<FavoriteRecord>> {
        self.backend().await?.list().await
    }

    /// Whether `pokemon_id` is a favorite.
    ///
    /// # Errors
    /// Returns `StorageError::Validation` for id 0, or the backend error.
    pub async fn is_favorite(&self, pokemon_id: u32) -> StorageResult<bool> {
        validate_pokemon_id(pokemon_id)?;
        self.backend().await?.contains(pokemon_id).await
    }

    /// Number of favorites.
    ///
    /// # Errors
    /// Returns the backend error.
    pub async fn count(&self) -> StorageResult<usize> {
        self.backend().await?.count().await
    }
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("backend", &self.backend.get().map(|b| b.name()))
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn apply(
    backend: &dyn FavoritesBackend,
    pokemon_id: u32,
    mutation: Mutation,
) -> StorageResult<(bool, Option<FavoriteEvent>)> {
    match mutation {
        Mutation::Add => {
            let created = backend.insert(pokemon_id).await?;
            Ok((true, created.then_some(FavoriteEvent::Added(pokemon_id))))
        }
        Mutation::Remove => {
            let deleted = backend.delete(pokemon_id).await?;
            Ok((false, deleted.then_some(FavoriteEvent::Removed(pokemon_id))))
        }
        Mutation::Toggle => {
            let now_favorite = backend.toggle(pokemon_id).await?;
            let event = if now_favorite {
                FavoriteEvent::Added(pokemon_id)
            } else {
                FavoriteEvent::Removed(pokemon_id)
            };
            Ok((now_favorite, Some(event)))
        }
    }
}

fn acquire_id_lock(locks: &Mutex<HashMap<u32, IdLock>>, pokemon_id: u32) -> IdLock {
    let mut locks = locks.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(pokemon_id).or_default())
}

/// Drop the map entry once no other mutation holds or waits on it.
fn release_id_lock(locks: &Mutex<HashMap<u32, IdLock>>, pokemon_id: u32, lock: &IdLock) {
    let mut locks = locks.lock().unwrap_or_else(PoisonError::into_inner);
    let uncontended = locks
        .get(&pokemon_id)
        .is_some_and(|entry| Arc::ptr_eq(entry, lock) && Arc::strong_count(lock) == 2);
    if uncontended {
        locks.remove(&pokemon_id);
    }
}
