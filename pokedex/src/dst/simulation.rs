//! Simulation - DST Test Harness
//!
//! TigerStyle: Simulation harness that provides deterministic environment.

use std::future::Future;
use std::sync::Arc;

use super::clock::SimClock;
use super::config::SimConfig;
use super::fault::{FaultConfig, FaultInjector, FaultInjectorBuilder, FaultType};
use super::rng::DeterministicRng;
use crate::catalog::SimCatalogProvider;
use crate::dex::Pokedex;
use crate::favorites::{FavoritesStore, SimFavoritesBackend};

/// Environment provided to simulation tests.
///
/// Every component created from the environment shares its clock and its
/// fault injector, so faults registered on the `Simulation` reach them.
pub struct SimEnvironment {
    /// Simulation configuration
    pub config: SimConfig,
    /// Simulated clock
    pub clock: SimClock,
    /// Deterministic RNG
    pub rng: DeterministicRng,
    /// Fault injector shared with every simulated component
    pub faults: Arc<FaultInjector>,
}

impl SimEnvironment {
    /// Advance simulated time in milliseconds.
    pub fn advance_time_ms(&self, ms: u64) -> u64 {
        self.clock.advance_ms(ms)
    }

    /// Get current simulated time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Create a favorites backend wired to this environment.
    #[must_use]
    pub fn favorites_backend(&self) -> SimFavoritesBackend {
        SimFavoritesBackend::with_fault_injector(self.clock.clone(), Arc::clone(&self.faults))
    }

    /// Create a lazily opened favorites store over a simulated backend.
    ///
    /// The open itself goes through the fault injector (`favorites.open`).
    #[must_use]
    pub fn favorites_store(&self) -> FavoritesStore {
        let clock = self.clock.clone();
        let faults = Arc::clone(&self.faults);
        FavoritesStore::lazy(move || {
            let backend = SimFavoritesBackend::with_fault_injector(clock.clone(), Arc::clone(&faults));
            async move { backend.open().await }
        })
    }

    /// Create a catalog provider wired to this environment.
    #[must_use]
    pub fn catalog(&self) -> SimCatalogProvider {
        SimCatalogProvider::with_faults(self.config.seed(), Arc::clone(&self.faults))
    }

    /// Create a `Pokedex` whose catalog and store share this environment's faults.
    #[must_use]
    pub fn create_pokedex(&self) -> Pokedex {
        Pokedex::new(self.catalog(), self.favorites_store())
    }
}

/// DST simulation harness.
///
/// TigerStyle:
/// - Single seed controls all randomness
/// - Faults are registered explicitly
/// - Environment is provided to test closure
///
/// # Example
///
/// ```rust
/// use pokedex::dst::{FaultConfig, FaultType, SimConfig, Simulation};
///
/// # #[tokio::main]
/// # async fn main() {
/// let sim = Simulation::new(SimConfig::with_seed(42))
///     .with_fault(FaultConfig::new(FaultType::StorageWriteFail, 1.0));
///
/// let result = sim
///     .run(|env| async move {
///         let store = env.favorites_store();
///         store.add(25).await?;
///         Ok::<(), pokedex::favorites::StorageError>(())
///     })
///     .await;
/// assert!(result.is_err());
/// # }
/// ```
pub struct Simulation {
    config: SimConfig,
    fault_configs: Vec<FaultConfig>,
}

impl Simulation {
    /// Create a new simulation with the given configuration.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            fault_configs: Vec::new(),
        }
    }

    /// Register a fault to inject during simulation.
    #[must_use]
    pub fn with_fault(mut self, fault_config: FaultConfig) -> Self {
        self.fault_configs.push(fault_config);
        self
    }

    /// Add common storage faults.
    #[must_use]
    pub fn with_storage_faults(self, probability: f64) -> Self {
        self.with_fault(FaultConfig::new(FaultType::StorageWriteFail, probability))
            .with_fault(FaultConfig::new(FaultType::StorageReadFail, probability))
    }

    /// Add common network and API faults.
    #[must_use]
    pub fn with_network_faults(self, probability: f64) -> Self {
        self.with_fault(FaultConfig::new(FaultType::NetworkTimeout, probability))
            .with_fault(FaultConfig::new(FaultType::ApiServerError, probability))
    }

    /// Run the simulation with the given test function.
    ///
    /// # Errors
    /// Returns any error from the test function.
    pub async fn run<F, Fut, E>(self, test_fn: F) -> Result<(), E>
    where
        F: FnOnce(SimEnvironment) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let env = self.build();
        let faults = Arc::clone(&env.faults);
        let seed = env.config.seed();

        let result = test_fn(env).await;

        tracing::debug!(
            seed,
            injections = faults.total_injections(),
            ok = result.is_ok(),
            "simulation finished"
        );
        result
    }

    /// Build the simulation environment without running a test.
    #[must_use]
    pub fn build(self) -> SimEnvironment {
        let mut rng = DeterministicRng::new(self.config.seed());
        let clock = SimClock::new();

        let faults = self
            .fault_configs
            .into_iter()
            .fold(FaultInjectorBuilder::new(rng.fork()), FaultInjectorBuilder::with_fault)
            .build();

        SimEnvironment {
            config: self.config,
            clock,
            rng,
            faults: Arc::new(faults),
        }
    }
}

/// Create a simulation with an explicit seed, or one from `DST_SEED`.
#[must_use]
pub fn create_simulation(seed: Option<u64>) -> Simulation {
    let config = match seed {
        Some(s) => SimConfig::with_seed(s),
        None => SimConfig::from_env_or_random(),
    };
    Simulation::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::{FavoritesBackend, StorageError};

    #[tokio::test]
    async fn test_basic_simulation() {
        let sim = Simulation::new(SimConfig::with_seed(42));

        sim.run(|env| async move {
            let store = env.favorites_store();
            store.add(25).await?;
            env.advance_time_ms(1000);
            store.add(1).await?;

            assert_eq!(store.list().await?, vec![1, 25]);
            assert_eq!(env.now_ms(), 1000);
            Ok::<(), StorageError>(())
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_create_simulation() {
        let env = create_simulation(Some(42)).build();
        assert_eq!(env.config.seed(), 42);
        assert_eq!(env.faults.total_injections(), 0);
    }

    #[tokio::test]
    async fn test_fault_injection_through_harness() {
        let sim = Simulation::new(SimConfig::with_seed(42))
            .with_fault(FaultConfig::new(FaultType::StorageWriteFail, 1.0));

        let result = sim
            .run(|env| async move {
                env.favorites_backend().insert(4).await?;
                Ok::<(), StorageError>(())
            })
            .await;

        assert!(result.is_err(), "fault injection should fail the insert");
    }

    #[tokio::test]
    async fn test_fault_stats_shared() {
        let env = Simulation::new(SimConfig::with_seed(42))
            .with_fault(FaultConfig::new(FaultType::StorageReadFail, 1.0))
            .build();

        let backend = env.favorites_backend();
        assert!(backend.list().await.is_err());
        assert_eq!(env.faults.total_injections(), 1);
    }

    #[test]
    fn test_fluent_api() {
        let env = Simulation::new(SimConfig::with_seed(42))
            .with_storage_faults(0.1)
            .with_network_faults(0.05)
            .build();
        assert_eq!(env.faults.total_injections(), 0);
    }
}
