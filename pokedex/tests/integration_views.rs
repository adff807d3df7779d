//! Integration Tests for the Views
//!
//! Browse, search, favorites and detail driven through `Pokedex` over the
//! simulated catalog.

use std::sync::Arc;

use pokedex::catalog::display::{display_id, display_name, share_message, stat_percentage};
use pokedex::dst::{FaultConfig, FaultType, SimConfig, Simulation};
use pokedex::{
    FavoritesStore, Pokedex, PokedexConfig, PokedexError, SimCatalogProvider, ViewStatus,
};

// =============================================================================
// Browse
// =============================================================================

#[tokio::test]
async fn test_two_pages_are_distinct_and_ascending() {
    let dex = Pokedex::sim(42);
    dex.browser().load_next_page().await.unwrap();
    dex.browser().load_next_page().await.unwrap();

    let ids: Vec<u32> = dex.browser().items().iter().map(|i| i.id).collect();
    assert_eq!(ids.len(), 100);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn test_scrolling_to_the_end() {
    let dex = Pokedex::builder()
        .with_catalog(SimCatalogProvider::with_seed(42))
        .with_favorites(FavoritesStore::sim(42))
        .with_config(PokedexConfig::default().with_page_size(20).with_prefetch_threshold(5))
        .build()
        .unwrap();
    let browser = dex.browser();

    browser.load_next_page().await.unwrap();
    let mut index = 0;
    while browser.has_more() {
        index += 1;
        browser.on_item_visible(index).await.unwrap();
        assert!(index < 1000, "scrolling never finished");
    }

    assert_eq!(browser.len(), 151);
    assert_eq!(browser.pages_loaded(), 8);
    assert_eq!(browser.items().last().unwrap().name, "mew");
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_by_name_and_number() {
    let dex = Pokedex::sim(42);

    let names: Vec<String> = dex
        .search()
        .search("saur")
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, vec!["bulbasaur", "ivysaur", "venusaur"]);

    let hits = dex.search().search("150").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "mewtwo");

    assert!(dex.search().search("").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_independent_of_browse() {
    let sim = Simulation::new(SimConfig::with_seed(5))
        .with_fault(FaultConfig::new(FaultType::ApiServerError, 1.0).with_filter("catalog.list"));

    sim.run(|env| async move {
        let dex = env.create_pokedex();
        assert!(dex.browser().load_next_page().await.is_err());
        assert!(dex.browser().status().error().is_some());

        let hits = dex.search().search("pika").await?;
        assert_eq!(hits[0].id, 25);
        Ok::<(), PokedexError>(())
    })
    .await
    .unwrap();
}

// =============================================================================
// Favorites
// =============================================================================

#[tokio::test]
async fn test_favorites_partial_failure_then_retry() {
    let sim = Simulation::new(SimConfig::with_seed(42)).with_fault(
        FaultConfig::new(FaultType::NetworkTimeout, 1.0)
            .with_filter("catalog.detail[8]")
            .with_max_injections(1),
    );

    sim.run(|env| async move {
        let dex = env.create_pokedex();
        dex.favorites().add(7).await?;
        dex.favorites().add(8).await?;

        let snapshot = dex.favorites_view().load().await;
        assert!(matches!(snapshot.status, ViewStatus::Failed(PokedexError::Catalog(_))));
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].name, "squirtle");
        assert!(dex.cache().detail(7).is_some());

        let snapshot = dex.favorites_view().load().await;
        assert!(snapshot.status.is_ready());
        assert_eq!(
            snapshot.items.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["wartortle", "squirtle"]
        );
        Ok::<(), PokedexError>(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_favorites_view_follows_toggles() {
    let dex = Pokedex::sim(42);
    dex.favorites_view().load().await;

    dex.toggle_favorite(25).await.unwrap();
    dex.toggle_favorite(1).await.unwrap();
    let snapshot = dex.favorites_view().sync().await;
    assert_eq!(
        snapshot.items.iter().map(|i| i.id).collect::<Vec<_>>(),
        vec![1, 25]
    );

    dex.toggle_favorite(25).await.unwrap();
    let snapshot = dex.favorites_view().sync().await;
    assert_eq!(snapshot.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1]);
    assert_eq!(dex.favorites_view().snapshot(), snapshot);
}

// =============================================================================
// Detail
// =============================================================================

#[tokio::test]
async fn test_eevee_full_data() {
    let dex = Pokedex::sim(42);
    let data = dex.details().load(133).await.unwrap();

    let stages = data.evolution_chain.stages().unwrap();
    assert_eq!(stages[0].name, "eevee");
    assert_eq!(stages.len(), 4);
    assert!(stages[1..].iter().all(|s| s.depth == 1 && s.parent_id == Some(133)));

    assert_eq!(data.species.genus("en"), Some("Eevee Pokémon"));
    let flavor = data.species.flavor_text("en").unwrap();
    assert!(!flavor.contains('\n') && !flavor.contains('\u{c}'));

    assert_eq!(display_id(data.detail.id), "133");
    assert_eq!(display_name(&data.detail.name), "Eevee");
    assert_eq!(share_message(&data.detail), "Check out Eevee (#133) in the Pokédex!");
    assert_eq!(data.detail.stats.len(), 6);
    assert!(data
        .detail
        .stats
        .iter()
        .all(|s| stat_percentage(s.base_stat) <= 100.0));
}

#[tokio::test]
async fn test_single_stage_species() {
    let dex = Pokedex::sim(42);
    let data = dex.details().load(150).await.unwrap();
    let stages = data.evolution_chain.stages().unwrap();
    assert_eq!(stages.len(), 1);
    assert_eq!(stages[0].name, "mewtwo");
}

#[tokio::test]
async fn test_detail_failure_isolated_from_other_views() {
    let store = Arc::new(FavoritesStore::sim(42));
    let sim = Simulation::new(SimConfig::with_seed(6))
        .with_fault(FaultConfig::new(FaultType::ApiNotFound, 1.0).with_filter("catalog.species"));

    sim.run(|env| async move {
        let dex = Pokedex::builder()
            .with_shared_catalog(Arc::new(env.catalog()))
            .with_shared_favorites(Arc::clone(&store))
            .build()?;

        assert!(dex.details().load(1).await.is_err());
        assert_eq!(dex.browser().load_next_page().await?, 50);
        dex.toggle_favorite(1).await?;
        assert!(dex.favorites_view().load().await.status.is_ready());
        Ok::<(), PokedexError>(())
    })
    .await
    .unwrap();
}
