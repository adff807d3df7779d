//! DetailLoader - Everything the Detail Screen Needs
//!
//! `TigerStyle`: Detail and species are fetched concurrently; the evolution
//! chain follows once the species names it.

use std::sync::Arc;

use super::cache::CatalogCache;
use crate::catalog::{CatalogProvider, EvolutionStage, PokemonDetail, PokemonFullData};
use crate::error::PokedexResult;

/// Loads and caches full detail data.
#[derive(Debug, Clone)]
pub struct DetailLoader {
    catalog: Arc<dyn CatalogProvider>,
    cache: CatalogCache,
}

impl DetailLoader {
    /// Create a loader sharing `cache` with the other views.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogProvider>, cache: CatalogCache) -> Self {
        Self { catalog, cache }
    }

    /// Detail, species and evolution chain for `id`.
    ///
    /// # Errors
    /// Returns the first failure in the order detail, species, evolution.
    /// Whatever succeeded is cached regardless.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self, id: u32) -> PokedexResult<PokemonFullData> {
        let catalog = self.catalog.as_ref();
        let (detail, species) = futures::join!(
            self.cache.detail_or_fetch(catalog, id),
            self.cache.species_or_fetch(catalog, id)
        );
        let detail = detail?;
        let species = species?;

        let chain_id = species.evolution_chain_id()?;
        let evolution_chain = self.cache.chain_or_fetch(catalog, chain_id).await?;

        Ok(PokemonFullData {
            detail,
            species,
            evolution_chain,
        })
    }

    /// Detail only.
    ///
    /// # Errors
    /// Returns the catalog error.
    pub async fn detail(&self, id: u32) -> PokedexResult<PokemonDetail> {
        Ok(self.cache.detail_or_fetch(self.catalog.as_ref(), id).await?)
    }

    /// Detail looked up by name; the result is cached under its id.
    ///
    /// # Errors
    /// Returns the catalog error.
    pub async fn detail_by_name(&self, name: &str) -> PokedexResult<PokemonDetail> {
        let detail = self.catalog.fetch_detail_by_name(name).await?;
        self.cache.insert_detail(detail.clone());
        Ok(detail)
    }

    /// Flattened evolution stages of the chain containing `id`.
    ///
    /// # Errors
    /// Same as [`load`](Self::load).
    pub async fn evolution_stages(&self, id: u32) -> PokedexResult<Vec<EvolutionStage>> {
        Ok(self.load(id).await?.evolution_chain.stages()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, SimCatalogProvider};
    use crate::dst::{DeterministicRng, FaultConfig, FaultInjectorBuilder, FaultType};
    use crate::error::PokedexError;

    fn loader_with(faults: Vec<FaultConfig>) -> (DetailLoader, SimCatalogProvider) {
        let injector = faults
            .into_iter()
            .fold(FaultInjectorBuilder::new(DeterministicRng::new(11)), FaultInjectorBuilder::with_fault)
            .build();
        let catalog = SimCatalogProvider::with_faults(42, Arc::new(injector));
        (
            DetailLoader::new(Arc::new(catalog.clone()), CatalogCache::new()),
            catalog,
        )
    }

    #[tokio::test]
    async fn test_load_full_data() {
        let (loader, catalog) = loader_with(vec![]);
        let data = loader.load(133).await.unwrap();

        assert_eq!(data.detail.name, "eevee");
        assert_eq!(data.species.id, 133);
        assert_eq!(data.evolution_chain.id, 67);
        assert!(data.evolution_chain.contains(136));

        loader.load(133).await.unwrap();
        let stats = catalog.requests();
        assert_eq!((stats.detail, stats.species, stats.evolution), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_chain_shared_between_family_members() {
        let (loader, catalog) = loader_with(vec![]);
        loader.load(4).await.unwrap();
        let stages = loader.evolution_stages(6).await.unwrap();

        assert_eq!(
            stages.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["charmander", "charmeleon", "charizard"]
        );
        assert_eq!(catalog.requests().evolution, 1);
    }

    #[tokio::test]
    async fn test_error_precedence_detail_first() {
        let (loader, _) = loader_with(vec![
            FaultConfig::new(FaultType::ApiNotFound, 1.0).with_filter("catalog.species[25]"),
            FaultConfig::new(FaultType::ApiServerError, 1.0).with_filter("catalog.detail[25]"),
        ]);

        let err = loader.load(25).await.unwrap_err();
        assert!(matches!(
            err,
            PokedexError::Catalog(CatalogError::Http { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_species_failure_keeps_detail_cached() {
        let (loader, catalog) = loader_with(vec![FaultConfig::new(FaultType::NetworkTimeout, 1.0)
            .with_filter("catalog.species[1]")
            .with_max_injections(1)]);

        assert!(matches!(
            loader.load(1).await,
            Err(PokedexError::Catalog(CatalogError::Transport { .. }))
        ));
        loader.load(1).await.unwrap();
        assert_eq!(catalog.requests().detail, 1);
        assert_eq!(catalog.requests().species, 2);
    }

    #[tokio::test]
    async fn test_evolution_failure_last() {
        let (loader, _) = loader_with(vec![
            FaultConfig::new(FaultType::ApiSchemaMismatch, 1.0).with_filter("catalog.evolution")
        ]);
        assert!(matches!(
            loader.load(7).await,
            Err(PokedexError::Catalog(CatalogError::Schema { .. }))
        ));
    }

    #[tokio::test]
    async fn test_detail_by_name_populates_cache() {
        let (loader, catalog) = loader_with(vec![]);
        let detail = loader.detail_by_name("mew").await.unwrap();
        assert_eq!(detail.id, 151);

        loader.detail(151).await.unwrap();
        assert_eq!(catalog.requests().detail, 1);
    }
}
