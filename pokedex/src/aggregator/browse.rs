//! PagedBrowser - Infinite Scroll Over the Catalog
//!
//! `TigerStyle`: Pages are requested at fixed-stride offsets
//! (`0, page_size, 2 * page_size, ...`); the server's `next` URL only
//! decides whether another page exists.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::ViewStatus;
use crate::catalog::{CatalogProvider, PokemonListItem};
use crate::error::{PokedexError, PokedexResult};

#[derive(Debug, Default)]
struct BrowseState {
    items: Vec<PokemonListItem>,
    pages_loaded: u32,
    has_more: bool,
    total: Option<u32>,
    status: ViewStatus,
}

impl BrowseState {
    fn fresh() -> Self {
        Self {
            has_more: true,
            ..Self::default()
        }
    }
}

/// Point-in-time copy of the browse list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseSnapshot {
    /// Every loaded entry, in catalog order
    pub items: Vec<PokemonListItem>,
    /// Whether another page may be loaded
    pub has_more: bool,
    /// Server-reported total, once a page has loaded
    pub total: Option<u32>,
    /// Status of the last page load
    pub status: ViewStatus,
}

/// Accumulates catalog pages into one flat list.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use pokedex::aggregator::PagedBrowser;
/// use pokedex::catalog::SimCatalogProvider;
///
/// # #[tokio::main]
/// # async fn main() {
/// let browser = PagedBrowser::new(Arc::new(SimCatalogProvider::with_seed(42)), 50, 10);
/// browser.load_next_page().await.unwrap();
/// browser.on_item_visible(45).await.unwrap();
/// assert_eq!(browser.len(), 100);
/// # }
/// ```
#[derive(Debug)]
pub struct PagedBrowser {
    catalog: Arc<dyn CatalogProvider>,
    page_size: u32,
    prefetch_threshold: usize,
    state: Mutex<BrowseState>,
    /// Held for the duration of a page load
    loading: tokio::sync::Mutex<()>,
}

impl PagedBrowser {
    /// Create a browser with nothing loaded.
    ///
    /// # Panics
    /// Panics if `page_size` is zero.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogProvider>, page_size: u32, prefetch_threshold: usize) -> Self {
        // Precondition
        assert!(page_size > 0, "page_size must be positive");

        Self {
            catalog,
            page_size,
            prefetch_threshold,
            state: Mutex::new(BrowseState::fresh()),
            loading: tokio::sync::Mutex::new(()),
        }
    }

    fn state(&self) -> MutexGuard<'_, BrowseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the page after the last loaded one.
    ///
    /// Returns the number of entries appended: 0 when the catalog is
    /// exhausted, or when this call joined a load already in flight.
    ///
    /// # Errors
    /// Returns the catalog error; loaded entries are kept and the same page
    /// is requested again on the next call.
    pub async fn load_next_page(&self) -> PokedexResult<usize> {
        let _loading = match self.loading.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                // Coalesce with the in-flight load and report its outcome.
                let _joined = self.loading.lock().await;
                return match &self.state().status {
                    ViewStatus::Failed(e) => Err(e.clone()),
                    ViewStatus::Idle | ViewStatus::Ready => Ok(0),
                };
            }
        };

        let (offset, has_more) = {
            let state = self.state();
            (state.pages_loaded * self.page_size, state.has_more)
        };
        if !has_more {
            return Ok(0);
        }

        tracing::debug!(offset, limit = self.page_size, "loading browse page");
        match self.catalog.fetch_list(offset, self.page_size).await {
            Ok(page) => {
                let appended = page.items.len();
                let mut state = self.state();
                state.items.extend(page.items);
                state.pages_loaded += 1;
                state.has_more = page.has_more;
                state.total = Some(page.total);
                state.status = ViewStatus::Ready;
                Ok(appended)
            }
            Err(e) => {
                tracing::warn!(offset, error = %e, "browse page failed");
                let error = PokedexError::from(e);
                self.state().status = ViewStatus::Failed(error.clone());
                Err(error)
            }
        }
    }

    /// Report that the entry at `index` became visible.
    ///
    /// Loads the next page when `index` is within the prefetch threshold of
    /// the end of the loaded list and more pages exist.
    ///
    /// # Errors
    /// Returns the page load error, if a load was triggered.
    pub async fn on_item_visible(&self, index: usize) -> PokedexResult<usize> {
        let should_load = {
            let state = self.state();
            state.has_more && index.saturating_add(self.prefetch_threshold) >= state.items.len()
        };
        if should_load {
            self.load_next_page().await
        } else {
            Ok(0)
        }
    }

    /// Forget everything loaded; the next load starts at offset 0.
    pub async fn reset(&self) {
        let _loading = self.loading.lock().await;
        *self.state() = BrowseState::fresh();
    }

    /// Loaded entries.
    #[must_use]
    pub fn items(&self) -> Vec<PokemonListItem> {
        self.state().items.clone()
    }

    /// Number of loaded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    /// Whether nothing is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state().items.is_empty()
    }

    /// Whether another page may be loaded.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.state().has_more
    }

    /// Pages loaded since creation or the last reset.
    #[must_use]
    pub fn pages_loaded(&self) -> u32 {
        self.state().pages_loaded
    }

    /// Status of the last page load.
    #[must_use]
    pub fn status(&self) -> ViewStatus {
        self.state().status.clone()
    }

    /// Copy of the whole view state.
    #[must_use]
    pub fn snapshot(&self) -> BrowseSnapshot {
        let state = self.state();
        BrowseSnapshot {
            items: state.items.clone(),
            has_more: state.has_more,
            total: state.total,
            status: state.status.clone(),
        }
    }
}
