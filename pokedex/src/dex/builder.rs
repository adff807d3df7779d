//! Pokedex Builder
//!
//! `TigerStyle`: Every component is explicit; a missing one is an error,
//! not a silent default.

use std::sync::Arc;

use super::Pokedex;
use crate::catalog::CatalogProvider;
use crate::config::PokedexConfig;
use crate::error::{PokedexError, PokedexResult};
use crate::favorites::FavoritesStore;

// =============================================================================
// PokedexBuilder
// =============================================================================

/// Builder for [`Pokedex`].
///
/// # Example
///
/// ```rust
/// use pokedex::catalog::SimCatalogProvider;
/// use pokedex::config::PokedexConfig;
/// use pokedex::favorites::FavoritesStore;
/// use pokedex::Pokedex;
///
/// let dex = Pokedex::builder()
///     .with_catalog(SimCatalogProvider::with_seed(42))
///     .with_favorites(FavoritesStore::sim(42))
///     .with_config(PokedexConfig::default().with_page_size(20))
///     .build()
///     .unwrap();
/// assert_eq!(dex.config().page_size, 20);
/// ```
#[derive(Debug, Default)]
pub struct PokedexBuilder {
    catalog: Option<Arc<dyn CatalogProvider>>,
    favorites: Option<Arc<FavoritesStore>>,
    config: Option<PokedexConfig>,
}

impl PokedexBuilder {
    /// Create a builder with no components set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the catalog provider.
    #[must_use]
    pub fn with_catalog(mut self, catalog: impl CatalogProvider + 'static) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    /// Set an already shared catalog provider.
    #[must_use]
    pub fn with_shared_catalog(mut self, catalog: Arc<dyn CatalogProvider>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set the favorites store.
    #[must_use]
    pub fn with_favorites(mut self, store: FavoritesStore) -> Self {
        self.favorites = Some(Arc::new(store));
        self
    }

    /// Set an already shared favorites store.
    #[must_use]
    pub fn with_shared_favorites(mut self, store: Arc<FavoritesStore>) -> Self {
        self.favorites = Some(store);
        self
    }

    /// Set the configuration (default: [`PokedexConfig::default`]).
    #[must_use]
    pub fn with_config(mut self, config: PokedexConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the Pokédex.
    ///
    /// # Errors
    /// Returns `PokedexError::MissingComponent` if the catalog or the
    /// favorites store was not set, or `PokedexError::Config` if the
    /// configuration is invalid.
    pub fn build(self) -> PokedexResult<Pokedex> {
        let catalog = self
            .catalog
            .ok_or_else(|| PokedexError::missing_component("catalog"))?;
        let favorites = self
            .favorites
            .ok_or_else(|| PokedexError::missing_component("favorites"))?;
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pokedex::from_parts(catalog, favorites, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SimCatalogProvider;
    use crate::config::ConfigError;

    #[test]
    fn test_missing_catalog() {
        let err = PokedexBuilder::new()
            .with_favorites(FavoritesStore::sim(1))
            .build()
            .unwrap_err();
        assert_eq!(err, PokedexError::missing_component("catalog"));
    }

    #[test]
    fn test_missing_favorites() {
        let err = PokedexBuilder::new()
            .with_catalog(SimCatalogProvider::with_seed(1))
            .build()
            .unwrap_err();
        assert_eq!(err, PokedexError::missing_component("favorites"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = PokedexBuilder::new()
            .with_catalog(SimCatalogProvider::with_seed(1))
            .with_favorites(FavoritesStore::sim(1))
            .with_config(PokedexConfig::default().with_page_size(0))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            PokedexError::Config(ConfigError::InvalidPageSize { value: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_shared_store_sees_same_favorites() {
        let store = Arc::new(FavoritesStore::sim(3));
        let dex = PokedexBuilder::new()
            .with_catalog(SimCatalogProvider::with_seed(3))
            .with_shared_favorites(Arc::clone(&store))
            .build()
            .unwrap();

        dex.toggle_favorite(151).await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec![151]);
    }
}
