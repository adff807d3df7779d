//! FavoritesView - Favorites Resolved Against the Catalog
//!
//! `TigerStyle`: The store is the source of truth for which ids are
//! favorites; the catalog only supplies their names. Detail fetches for
//! different ids are independent, so one failure never hides the others.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use tokio::sync::broadcast::{self, error::TryRecvError};

use super::cache::CatalogCache;
use super::ViewStatus;
use crate::catalog::{CatalogProvider, FavoritePokemonItem};
use crate::error::PokedexError;
use crate::favorites::{FavoriteEvent, FavoritesStore};

/// What the favorites screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FavoritesSnapshot {
    /// Favorites with a resolved detail, most recent first
    pub items: Vec<FavoritePokemonItem>,
    /// Status of the last load or sync
    pub status: ViewStatus,
}

#[derive(Debug, Default)]
struct ViewState {
    /// Last known-good id list from the store, most recent first
    ids: Vec<u32>,
    snapshot: FavoritesSnapshot,
}

/// Favorites list joined with catalog details.
#[derive(Debug)]
pub struct FavoritesView {
    catalog: Arc<dyn CatalogProvider>,
    store: Arc<FavoritesStore>,
    cache: CatalogCache,
    state: Mutex<ViewState>,
    events: Mutex<broadcast::Receiver<FavoriteEvent>>,
    /// Serializes `load` and `sync`
    refreshing: tokio::sync::Mutex<()>,
}

impl FavoritesView {
    /// Create a view; changes to `store` from now on are picked up by `sync`.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        store: Arc<FavoritesStore>,
        cache: CatalogCache,
    ) -> Self {
        let events = store.subscribe();
        Self {
            catalog,
            store,
            cache,
            state: Mutex::new(ViewState::default()),
            events: Mutex::new(events),
            refreshing: tokio::sync::Mutex::new(()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-read the id list from the store and resolve every detail.
    ///
    /// Pending change events are discarded, since the store read already
    /// reflects them. On a store failure the previous id list and items are
    /// kept and the status becomes `Failed`.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> FavoritesSnapshot {
        let _refreshing = self.refreshing.lock().await;
        self.load_locked().await
    }

    async fn load_locked(&self) -> FavoritesSnapshot {
        self.drain_events();

        match self.store.list().await {
            Ok(ids) => {
                self.state().ids.clone_from(&ids);
                self.resolve(ids).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "favorites list failed to load");
                let mut state = self.state();
                state.snapshot.status = ViewStatus::Failed(PokedexError::from(e));
                state.snapshot.clone()
            }
        }
    }

    /// Apply pending change events to the in-memory list, then resolve any
    /// missing details. The store is not read again unless events were lost.
    #[tracing::instrument(skip(self))]
    pub async fn sync(&self) -> FavoritesSnapshot {
        let _refreshing = self.refreshing.lock().await;

        let Some(events) = self.drain_events() else {
            tracing::debug!("favorites events lagged, reloading");
            return self.load_locked().await;
        };

        let ids = {
            let mut state = self.state();
            for event in events {
                match event {
                    FavoriteEvent::Added(id) => {
                        state.ids.retain(|known| *known != id);
                        state.ids.insert(0, id);
                    }
                    FavoriteEvent::Removed(id) => state.ids.retain(|known| *known != id),
                }
            }
            state.ids.clone()
        };
        self.resolve(ids).await
    }

    /// Last computed snapshot.
    #[must_use]
    pub fn snapshot(&self) -> FavoritesSnapshot {
        self.state().snapshot.clone()
    }

    /// Current id list, most recent first.
    #[must_use]
    pub fn ids(&self) -> Vec<u32> {
        self.state().ids.clone()
    }

    /// Pending events, or `None` if some were dropped.
    fn drain_events(&self) -> Option<Vec<FavoriteEvent>> {
        let mut receiver = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        let mut events = Vec::new();
        let mut lagged = false;
        loop {
            match receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Lagged(_)) => lagged = true,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        (!lagged).then_some(events)
    }

    /// Fetch uncached details concurrently and rebuild the snapshot.
    async fn resolve(&self, ids: Vec<u32>) -> FavoritesSnapshot {
        let catalog = self.catalog.as_ref();
        let missing: Vec<u32> = ids
            .iter()
            .copied()
            .filter(|id| self.cache.detail(*id).is_none())
            .collect();

        let results = join_all(
            missing
                .iter()
                .map(|id| self.cache.detail_or_fetch(catalog, *id)),
        )
        .await;

        let first_error = missing
            .iter()
            .zip(results)
            .find_map(|(id, result)| result.err().map(|e| (*id, e)));

        let items: Vec<FavoritePokemonItem> = ids
            .iter()
            .filter_map(|id| self.cache.detail(*id))
            .map(|detail| FavoritePokemonItem::from(&detail))
            .collect();

        let status = match first_error {
            Some((id, e)) => {
                tracing::warn!(id, error = %e, "favorite detail failed to load");
                ViewStatus::Failed(PokedexError::from(e))
            }
            None => ViewStatus::Ready,
        };

        let snapshot = FavoritesSnapshot { items, status };
        self.state().snapshot = snapshot.clone();
        snapshot
    }
}
