//! `SimFavoritesBackend` - In-Memory Favorites for Testing
//!
//! `TigerStyle`: Deterministic testing with fault injection.
//!
//! # Simulation-First
//!
//! Records are stamped from a `SimClock`, so tests control `added_at`
//! exactly (including ties). Every operation first asks the shared
//! `FaultInjector` whether it should fail.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::dst::{DeterministicRng, FaultConfig, FaultInjector, FaultType, SimClock, SimConfig};

use super::backend::FavoritesBackend;
use super::error::{StorageError, StorageResult};
use super::record::{sort_most_recent_first, FavoriteRecord};

// =============================================================================
// SimFavoritesBackend
// =============================================================================

#[derive(Debug, Default)]
struct SimTable {
    rows: HashMap<u32, FavoriteRecord>,
    /// Last surrogate key handed out (AUTOINCREMENT never reuses keys)
    last_id: i64,
}

impl SimTable {
    fn insert(&mut self, pokemon_id: u32, clock: &SimClock) -> bool {
        if self.rows.contains_key(&pokemon_id) {
            return false;
        }
        self.last_id += 1;
        let record = FavoriteRecord {
            id: self.last_id,
            pokemon_id,
            added_at: clock.now(),
        };
        self.rows.insert(pokemon_id, record);
        true
    }
}

/// In-memory favorites backend for testing.
///
/// `TigerStyle`:
/// - Deterministic via `SimClock`
/// - Fault injection via `FaultInjector`
/// - Thread-safe with `RwLock`; clones share the same table
#[derive(Debug, Clone)]
pub struct SimFavoritesBackend {
    table: Arc<RwLock<SimTable>>,
    fault_injector: Arc<FaultInjector>,
    clock: SimClock,
}

impl SimFavoritesBackend {
    /// Create a backend with its own (empty) fault injector.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        let mut rng = DeterministicRng::new(config.seed());
        Self::with_fault_injector(SimClock::new(), Arc::new(FaultInjector::new(rng.fork())))
    }

    /// Create a backend sharing a clock and fault injector with a `Simulation`.
    #[must_use]
    pub fn with_fault_injector(clock: SimClock, fault_injector: Arc<FaultInjector>) -> Self {
        Self {
            table: Arc::new(RwLock::new(SimTable::default())),
            fault_injector,
            clock,
        }
    }

    /// Register a fault on this backend's own injector.
    ///
    /// # Panics
    /// Panics if the injector is already shared.
    #[must_use]
    pub fn with_faults(mut self, config: FaultConfig) -> Self {
        match Arc::get_mut(&mut self.fault_injector) {
            Some(injector) => injector.register(config),
            None => panic!("cannot add faults after backend is shared"),
        }
        self
    }

    /// Simulate opening the database.
    ///
    /// # Errors
    /// Returns a simulated fault if `favorites.open` is injected.
    pub async fn open(self) -> StorageResult<Self> {
        self.maybe_inject_fault("favorites.open")?;
        Ok(self)
    }

    /// Get the simulated clock.
    #[must_use]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Check if a fault should be injected for an operation.
    fn maybe_inject_fault(&self, operation: &str) -> StorageResult<()> {
        match self
            .fault_injector
            .should_inject_matching(operation, FaultType::is_storage)
        {
            Some(fault_type) => Err(StorageError::simulated_fault(format!(
                "{fault_type:?} during {operation}"
            ))),
            None => Ok(()),
        }
    }

    fn read_table(&self) -> RwLockReadGuard<'_, SimTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, SimTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl FavoritesBackend for SimFavoritesBackend {
    #[tracing::instrument(skip(self))]
    async fn insert(&self, pokemon_id: u32) -> StorageResult<bool> {
        // Check for faults
        self.maybe_inject_fault("favorites.insert")?;

        Ok(self.write_table().insert(pokemon_id, &self.clock))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, pokemon_id: u32) -> StorageResult<bool> {
        // Check for faults
        self.maybe_inject_fault("favorites.delete")?;

        Ok(self.write_table().rows.remove(&pokemon_id).is_some())
    }

    #[tracing::instrument(skip(self))]
    async fn toggle(&self, pokemon_id: u32) -> StorageResult<bool> {
        // Check for faults
        self.maybe_inject_fault("favorites.toggle")?;

        let mut table = self.write_table();
        if table.rows.remove(&pokemon_id).is_some() {
            return Ok(false);
        }
        let inserted = table.insert(pokemon_id, &self.clock);

        // Postcondition
        assert!(inserted, "absent id must insert");
        Ok(true)
    }

    async fn contains(&self, pokemon_id: u32) -> StorageResult<bool> {
        // Check for faults
        self.maybe_inject_fault("favorites.contains")?;

        Ok(self.read_table().rows.contains_key(&pokemon_id))
    }

    async fn list(&self) -> StorageResult<Vec<FavoriteRecord>> {
        // Check for faults
        self.maybe_inject_fault("favorites.list")?;

        let mut records: Vec<FavoriteRecord> = self.read_table().rows.values().cloned().collect();
        sort_most_recent_first(&mut records);
        Ok(records)
    }

    async fn count(&self) -> StorageResult<usize> {
        // Check for faults
        self.maybe_inject_fault("favorites.count")?;

        Ok(self.read_table().rows.len())
    }

    fn name(&self) -> &'static str {
        "sim"
    }
}

// =============================================================================
// TESTS - Written FIRST (Simulation-First)
// =============================================================================
