//! CatalogCache - Shared Per-Id Response Cache
//!
//! `TigerStyle`: The catalog is static, so entries never expire. Only
//! successful responses are stored.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

use crate::catalog::{
    CatalogError, CatalogProvider, CatalogResult, EvolutionChain, PokemonDetail, PokemonSpecies,
};

#[derive(Debug)]
struct Table<K, V>(RwLock<HashMap<K, V>>);

impl<K: Eq + Hash, V: Clone> Table<K, V> {
    fn new() -> Self {
        Self(RwLock::new(HashMap::new()))
    }

    fn get(&self, key: &K) -> Option<V> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn insert(&self, key: K, value: V) {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }

    fn len(&self) -> usize {
        self.0.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn clear(&self) {
        self.0.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Reject a response whose own id is not the one requested.
fn check_id(kind: &str, requested: u32, got: u32) -> CatalogResult<()> {
    if got == requested {
        return Ok(());
    }
    Err(CatalogError::schema(
        format!("{kind}/{requested}"),
        format!("response id {got} does not match requested id {requested}"),
    ))
}

/// Details, species and evolution chains already fetched.
///
/// Clones share the same tables.
#[derive(Debug, Clone)]
pub struct CatalogCache {
    details: Arc<Table<u32, PokemonDetail>>,
    species: Arc<Table<u32, PokemonSpecies>>,
    chains: Arc<Table<u32, EvolutionChain>>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            details: Arc::new(Table::new()),
            species: Arc::new(Table::new()),
            chains: Arc::new(Table::new()),
        }
    }

    /// Cached detail for `id`.
    #[must_use]
    pub fn detail(&self, id: u32) -> Option<PokemonDetail> {
        self.details.get(&id)
    }

    /// Store a detail under its own id.
    pub fn insert_detail(&self, detail: PokemonDetail) {
        self.details.insert(detail.id, detail);
    }

    /// Cached species for `id`.
    #[must_use]
    pub fn species(&self, id: u32) -> Option<PokemonSpecies> {
        self.species.get(&id)
    }

    /// Store a species under its own id.
    pub fn insert_species(&self, species: PokemonSpecies) {
        self.species.insert(species.id, species);
    }

    /// Cached evolution chain for `chain_id`.
    #[must_use]
    pub fn chain(&self, chain_id: u32) -> Option<EvolutionChain> {
        self.chains.get(&chain_id)
    }

    /// Store a chain under its own id.
    pub fn insert_chain(&self, chain: EvolutionChain) {
        self.chains.insert(chain.id, chain);
    }

    /// Number of cached details.
    #[must_use]
    pub fn detail_count(&self) -> usize {
        self.details.len()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.details.clear();
        self.species.clear();
        self.chains.clear();
    }

    // =========================================================================
    // Read-through
    // =========================================================================

    /// Cached detail, or fetch and cache it.
    ///
    /// # Errors
    /// Returns the fetch error, or `CatalogError::Schema` if the response
    /// carries another id. Nothing is cached on failure.
    pub async fn detail_or_fetch(
        &self,
        catalog: &dyn CatalogProvider,
        id: u32,
    ) -> CatalogResult<PokemonDetail> {
        if let Some(detail) = self.detail(id) {
            tracing::trace!(id, "detail cache hit");
            return Ok(detail);
        }
        let detail = catalog.fetch_detail(id).await?;
        check_id("pokemon", id, detail.id)?;
        self.details.insert(id, detail.clone());
        Ok(detail)
    }

    /// Cached species, or fetch and cache it.
    ///
    /// # Errors
    /// Same as [`detail_or_fetch`](Self::detail_or_fetch).
    pub async fn species_or_fetch(
        &self,
        catalog: &dyn CatalogProvider,
        id: u32,
    ) -> CatalogResult<PokemonSpecies> {
        if let Some(species) = self.species(id) {
            tracing::trace!(id, "species cache hit");
            return Ok(species);
        }
        let species = catalog.fetch_species(id).await?;
        check_id("pokemon-species", id, species.id)?;
        self.species.insert(id, species.clone());
        Ok(species)
    }

    /// Cached chain, or fetch and cache it.
    ///
    /// # Errors
    /// Same as [`detail_or_fetch`](Self::detail_or_fetch).
    pub async fn chain_or_fetch(
        &self,
        catalog: &dyn CatalogProvider,
        chain_id: u32,
    ) -> CatalogResult<EvolutionChain> {
        if let Some(chain) = self.chain(chain_id) {
            tracing::trace!(chain_id, "chain cache hit");
            return Ok(chain);
        }
        let chain = catalog.fetch_evolution_chain(chain_id).await?;
        check_id("evolution-chain", chain_id, chain.id)?;
        self.chains.insert(chain_id, chain.clone());
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SimCatalogProvider;
    use crate::catalog::{ListPage, PokemonListItem};
    use crate::dst::{DeterministicRng, FaultConfig, FaultInjectorBuilder, FaultType};

    /// Serves the entry after the one asked for.
    #[derive(Debug)]
    struct MislabeledCatalog(SimCatalogProvider);

    #[async_trait::async_trait]
    impl CatalogProvider for MislabeledCatalog {
        async fn fetch_list(&self, offset: u32, limit: u32) -> CatalogResult<ListPage> {
            self.0.fetch_list(offset, limit).await
        }

        async fn fetch_detail(&self, id: u32) -> CatalogResult<PokemonDetail> {
            self.0.fetch_detail(id + 1).await
        }

        async fn fetch_detail_by_name(&self, name: &str) -> CatalogResult<PokemonDetail> {
            self.0.fetch_detail_by_name(name).await
        }

        async fn fetch_all_names(&self) -> CatalogResult<Vec<PokemonListItem>> {
            self.0.fetch_all_names().await
        }

        async fn fetch_species(&self, id: u32) -> CatalogResult<PokemonSpecies> {
            self.0.fetch_species(id + 1).await
        }

        async fn fetch_evolution_chain(&self, chain_id: u32) -> CatalogResult<EvolutionChain> {
            self.0.fetch_evolution_chain(chain_id).await
        }

        fn name(&self) -> &'static str {
            "mislabeled"
        }

        fn is_simulation(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_read_through_fetches_once() {
        let catalog = SimCatalogProvider::with_seed(42);
        let cache = CatalogCache::new();

        let first = cache.detail_or_fetch(&catalog, 25).await.unwrap();
        let second = cache.detail_or_fetch(&catalog, 25).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(catalog.requests().detail, 1);
        assert_eq!(cache.detail_count(), 1);
    }

    #[tokio::test]
    async fn test_failures_not_cached() {
        let injector = FaultInjectorBuilder::new(DeterministicRng::new(1))
            .with_fault(
                FaultConfig::new(FaultType::ApiServerError, 1.0)
                    .with_filter("catalog.species[4]")
                    .with_max_injections(1),
            )
            .build();
        let catalog = SimCatalogProvider::with_faults(42, Arc::new(injector));
        let cache = CatalogCache::new();

        assert!(cache.species_or_fetch(&catalog, 4).await.is_err());
        assert!(cache.species(4).is_none());

        assert!(cache.species_or_fetch(&catalog, 4).await.is_ok());
        assert!(cache.species(4).is_some());
        assert_eq!(catalog.requests().species, 2);
    }

    #[tokio::test]
    async fn test_mismatched_id_is_schema_error() {
        let catalog = MislabeledCatalog(SimCatalogProvider::with_seed(42));
        let cache = CatalogCache::new();

        let err = cache.detail_or_fetch(&catalog, 25).await.unwrap_err();
        assert!(
            matches!(err, CatalogError::Schema { ref message, .. } if message.contains("26")),
            "got {err:?}"
        );
        assert!(cache.detail(25).is_none());
        assert!(cache.detail(26).is_none());

        assert!(cache.species_or_fetch(&catalog, 4).await.is_err());
        assert!(cache.species(4).is_none());
    }

    #[tokio::test]
    async fn test_clones_share_tables() {
        let catalog = SimCatalogProvider::with_seed(42);
        let cache = CatalogCache::new();
        let clone = cache.clone();

        clone.chain_or_fetch(&catalog, 67).await.unwrap();
        assert!(cache.chain(67).is_some());

        cache.clear();
        assert!(clone.chain(67).is_none());
    }
}
