//! Pokedex - Orchestrator
//!
//! `TigerStyle`: One explicitly constructed value owns the catalog, the
//! favorites store and every view. Nothing is global.
//!
//! # Example
//!
//! ```rust
//! use pokedex::Pokedex;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), pokedex::PokedexError> {
//! let dex = Pokedex::sim(42);
//!
//! assert!(dex.toggle_favorite(25).await?);
//! assert!(dex.favorites().is_favorite(25).await?);
//!
//! let view = dex.favorites_view().load().await;
//! assert_eq!(view.items[0].name, "pikachu");
//! # Ok(())
//! # }
//! ```

mod builder;

pub use builder::PokedexBuilder;

use std::sync::Arc;

use crate::aggregator::{CatalogCache, DetailLoader, FavoritesView, PagedBrowser, SearchIndex};
use crate::catalog::{artwork_url, sprite_url, CatalogProvider, SimCatalogProvider};
use crate::config::PokedexConfig;
use crate::error::PokedexResult;
use crate::favorites::FavoritesStore;

/// The Pokédex core.
///
/// Views share one [`CatalogCache`], so a detail fetched by one view is
/// reused by the others.
#[derive(Debug)]
pub struct Pokedex {
    catalog: Arc<dyn CatalogProvider>,
    store: Arc<FavoritesStore>,
    cache: CatalogCache,
    config: PokedexConfig,
    browser: PagedBrowser,
    search: SearchIndex,
    favorites_view: FavoritesView,
    details: DetailLoader,
}

impl Pokedex {
    /// Create a Pokédex over `catalog` and `store` with default configuration.
    #[must_use]
    pub fn new(catalog: impl CatalogProvider + 'static, store: FavoritesStore) -> Self {
        Self::from_parts(Arc::new(catalog), Arc::new(store), PokedexConfig::default())
    }

    /// Create a Pokédex with simulated catalog and favorites.
    #[must_use]
    pub fn sim(seed: u64) -> Self {
        Self::new(SimCatalogProvider::with_seed(seed), FavoritesStore::sim(seed))
    }

    /// Create a Pokédex over the remote catalog and a SQLite store at
    /// `config.database_path`, opened on first use.
    ///
    /// # Errors
    /// Returns `PokedexError::Config` if `config` is invalid, or
    /// `PokedexError::Catalog` if the HTTP client cannot be built.
    #[cfg(all(feature = "sqlite", feature = "http"))]
    pub fn from_config(config: PokedexConfig) -> PokedexResult<Self> {
        config.validate()?;
        let catalog = crate::catalog::HttpCatalogProvider::from_config(&config)?;
        let store = FavoritesStore::sqlite(config.database_path.clone());
        Ok(Self::from_parts(Arc::new(catalog), Arc::new(store), config))
    }

    /// Start building a Pokédex from explicit components.
    #[must_use]
    pub fn builder() -> PokedexBuilder {
        PokedexBuilder::new()
    }

    pub(crate) fn from_parts(
        catalog: Arc<dyn CatalogProvider>,
        store: Arc<FavoritesStore>,
        config: PokedexConfig,
    ) -> Self {
        let cache = CatalogCache::new();
        let browser = PagedBrowser::new(
            Arc::clone(&catalog),
            config.page_size,
            config.prefetch_threshold,
        );
        let search = SearchIndex::new(Arc::clone(&catalog));
        let favorites_view =
            FavoritesView::new(Arc::clone(&catalog), Arc::clone(&store), cache.clone());
        let details = DetailLoader::new(Arc::clone(&catalog), cache.clone());

        Self {
            catalog,
            store,
            cache,
            config,
            browser,
            search,
            favorites_view,
            details,
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Infinite-scroll browse list.
    #[must_use]
    pub fn browser(&self) -> &PagedBrowser {
        &self.browser
    }

    /// Name and number search.
    #[must_use]
    pub fn search(&self) -> &SearchIndex {
        &self.search
    }

    /// The favorites store.
    #[must_use]
    pub fn favorites(&self) -> &Arc<FavoritesStore> {
        &self.store
    }

    /// Favorites resolved against the catalog.
    #[must_use]
    pub fn favorites_view(&self) -> &FavoritesView {
        &self.favorites_view
    }

    /// Detail screen loader.
    #[must_use]
    pub fn details(&self) -> &DetailLoader {
        &self.details
    }

    /// The catalog provider.
    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn CatalogProvider> {
        &self.catalog
    }

    /// Cache shared by the views.
    #[must_use]
    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &PokedexConfig {
        &self.config
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Flip favorite membership of `id`; returns the new membership.
    ///
    /// # Errors
    /// Returns `PokedexError::Storage` on validation or backend failure.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_favorite(&self, id: u32) -> PokedexResult<bool> {
        let now_favorite = self.store.toggle(id).await?;
        tracing::debug!(id, now_favorite, "favorite toggled");
        Ok(now_favorite)
    }

    /// Front-default sprite URL for `id`.
    #[must_use]
    pub fn sprite_url(&self, id: u32) -> String {
        sprite_url(&self.config.sprites_base_url, id)
    }

    /// Official artwork URL for `id`.
    #[must_use]
    pub fn artwork_url(&self, id: u32) -> String {
        artwork_url(&self.config.sprites_base_url, id)
    }
}
