//! DST Tests for Favorites Under Storage Faults
//!
//! TigerStyle: Every failed mutation leaves the persisted set untouched, and
//! the same seed replays the same failures.

use std::collections::BTreeSet;

use pokedex::dst::{FaultConfig, FaultType, SimConfig, Simulation};
use pokedex::favorites::{FavoritesStore, StorageError};
use pokedex::{PokedexError, ViewStatus};

// =============================================================================
// Helpers
// =============================================================================

/// Run random toggles under write faults; returns each call's outcome.
async fn toggle_under_faults(seed: u64) -> Vec<Option<bool>> {
    let mut env = Simulation::new(SimConfig::with_seed(seed))
        .with_fault(FaultConfig::new(FaultType::StorageWriteFail, 0.3).with_filter("favorites.toggle"))
        .build();
    let store = FavoritesStore::new(env.favorites_backend());
    let mut model = BTreeSet::new();
    let mut outcomes = Vec::new();

    for _ in 0..60 {
        let id = env.rng.next_u32(1, 6);
        match store.toggle(id).await {
            Ok(true) => {
                assert!(model.insert(id), "toggle on must follow absence");
                outcomes.push(Some(true));
            }
            Ok(false) => {
                assert!(model.remove(&id), "toggle off must follow presence");
                outcomes.push(Some(false));
            }
            Err(e) => {
                assert!(e.is_transient(), "injected faults are transient: {e}");
                outcomes.push(None);
            }
        }

        let mut persisted = store.list().await.unwrap();
        persisted.sort_unstable();
        assert_eq!(persisted, model.iter().copied().collect::<Vec<_>>());
    }
    outcomes
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_failed_toggles_leave_state_unchanged() {
    let outcomes = toggle_under_faults(42).await;
    assert!(outcomes.iter().any(Option::is_none), "some toggles should fail");
    assert!(outcomes.iter().any(Option::is_some), "some toggles should succeed");
}

#[tokio::test]
async fn test_same_seed_same_failures() {
    assert_eq!(toggle_under_faults(7).await, toggle_under_faults(7).await);
}

#[tokio::test]
async fn test_write_failure_persists_nothing() {
    let sim = Simulation::new(SimConfig::with_seed(1))
        .with_fault(FaultConfig::new(FaultType::StorageWriteFail, 1.0).with_filter("favorites.insert"));

    sim.run(|env| async move {
        let store = FavoritesStore::new(env.favorites_backend());
        assert!(store.add(25).await.is_err());
        assert!(!store.is_favorite(25).await?);
        assert!(store.list().await?.is_empty());
        Ok::<(), StorageError>(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_failed_open_is_retried() {
    let sim = Simulation::new(SimConfig::with_seed(2)).with_fault(
        FaultConfig::new(FaultType::StorageOpenFail, 1.0)
            .with_filter("favorites.open")
            .with_max_injections(1),
    );

    sim.run(|env| async move {
        let store = env.favorites_store();
        assert!(store.add(1).await.is_err());
        assert!(!store.is_open());

        store.add(1).await?;
        assert!(store.is_open());
        assert_eq!(store.list().await?, vec![1]);
        Ok::<(), StorageError>(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_favorites_view_survives_read_failure() {
    let sim = Simulation::new(SimConfig::with_seed(3)).with_fault(
        FaultConfig::new(FaultType::StorageReadFail, 1.0)
            .with_filter("favorites.list")
            .with_max_injections(1),
    );

    sim.run(|env| async move {
        let dex = env.create_pokedex();
        dex.toggle_favorite(4).await?;

        let snapshot = dex.favorites_view().load().await;
        assert!(matches!(snapshot.status, ViewStatus::Failed(PokedexError::Storage(_))));
        assert!(snapshot.items.is_empty());

        // Events still flow while the store cannot be read
        dex.toggle_favorite(1).await?;
        let snapshot = dex.favorites_view().sync().await;
        assert_eq!(dex.favorites_view().ids(), vec![1]);
        assert!(snapshot.status.is_ready());

        let snapshot = dex.favorites_view().load().await;
        assert_eq!(
            snapshot.items.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![1, 4]
        );
        Ok::<(), PokedexError>(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_catalog_faults_do_not_reach_store() {
    let sim = Simulation::new(SimConfig::with_seed(4)).with_network_faults(1.0);

    sim.run(|env| async move {
        let dex = env.create_pokedex();
        assert!(dex.toggle_favorite(25).await?);
        assert!(dex.details().load(25).await.is_err());
        assert_eq!(dex.favorites().list().await?, vec![25]);
        Ok::<(), PokedexError>(())
    })
    .await
    .unwrap();
}
