//! FaultInjector - Probabilistic Fault Injection
//!
//! TigerStyle: Explicit fault injection for chaos testing.
//!
//! Simulated components name every operation they perform (for example
//! `favorites.insert` or `catalog.detail[25]`) and ask the shared injector
//! whether that operation should fail.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::rng::DeterministicRng;
use crate::constants::DST_FAULT_PROBABILITY_MAX;

/// Types of faults that can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultType {
    // =========================================================================
    // Storage Faults
    // =========================================================================
    /// Opening the database fails
    StorageOpenFail,
    /// Write operation fails
    StorageWriteFail,
    /// Read operation fails
    StorageReadFail,
    /// Delete operation fails
    StorageDeleteFail,
    /// Stored data cannot be decoded
    StorageCorruption,

    // =========================================================================
    // Network Faults
    // =========================================================================
    /// Connection timeout
    NetworkTimeout,
    /// Connection refused
    NetworkConnectionRefused,
    /// Connection reset mid-response
    NetworkReset,

    // =========================================================================
    // Catalog API Faults
    // =========================================================================
    /// Server answers 404
    ApiNotFound,
    /// Server answers 429
    ApiRateLimit,
    /// Server answers 5xx
    ApiServerError,
    /// Body does not match the expected schema
    ApiSchemaMismatch,
}

impl FaultType {
    /// Get the fault type name as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StorageOpenFail => "storage_open_fail",
            Self::StorageWriteFail => "storage_write_fail",
            Self::StorageReadFail => "storage_read_fail",
            Self::StorageDeleteFail => "storage_delete_fail",
            Self::StorageCorruption => "storage_corruption",
            Self::NetworkTimeout => "network_timeout",
            Self::NetworkConnectionRefused => "network_connection_refused",
            Self::NetworkReset => "network_reset",
            Self::ApiNotFound => "api_not_found",
            Self::ApiRateLimit => "api_rate_limit",
            Self::ApiServerError => "api_server_error",
            Self::ApiSchemaMismatch => "api_schema_mismatch",
        }
    }

    /// Whether this fault belongs to local storage.
    #[must_use]
    pub fn is_storage(self) -> bool {
        matches!(
            self,
            Self::StorageOpenFail
                | Self::StorageWriteFail
                | Self::StorageReadFail
                | Self::StorageDeleteFail
                | Self::StorageCorruption
        )
    }
}

/// Configuration for a specific fault.
#[derive(Debug, Clone)]
pub struct FaultConfig {
    /// The type of fault
    pub fault_type: FaultType,
    /// Probability of injection (0.0 to 1.0)
    pub probability: f64,
    /// Optional operation filter (substring match)
    pub operation_filter: Option<String>,
    /// Maximum number of injections (None = unlimited)
    pub max_injections: Option<u64>,
}

impl FaultConfig {
    /// Create a new fault configuration.
    ///
    /// # Panics
    /// Panics if probability is not in [0, 1].
    #[must_use]
    pub fn new(fault_type: FaultType, probability: f64) -> Self {
        // Precondition
        assert!(
            (0.0..=DST_FAULT_PROBABILITY_MAX).contains(&probability),
            "probability must be in [0, {}], got {}",
            DST_FAULT_PROBABILITY_MAX,
            probability
        );

        Self {
            fault_type,
            probability,
            operation_filter: None,
            max_injections: None,
        }
    }

    /// Only inject into operations whose name contains `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.operation_filter = Some(filter.into());
        self
    }

    /// Set maximum number of injections.
    ///
    /// # Panics
    /// Panics if `max` is zero.
    #[must_use]
    pub fn with_max_injections(mut self, max: u64) -> Self {
        // Precondition
        assert!(max > 0, "max_injections must be positive");
        self.max_injections = Some(max);
        self
    }

    fn matches(&self, operation: &str) -> bool {
        self.operation_filter
            .as_deref()
            .map_or(true, |filter| operation.contains(filter))
    }
}

/// Fault injector for simulation testing.
///
/// TigerStyle:
/// - Explicit fault registration
/// - Deterministic through RNG
/// - Statistics tracked per registered config
/// - Interior mutability for sharing via Arc
#[derive(Debug)]
pub struct FaultInjector {
    rng: Mutex<DeterministicRng>,
    configs: Vec<FaultConfig>,
    /// Injections performed, indexed like `configs`
    injection_counts: Mutex<Vec<u64>>,
}

impl FaultInjector {
    /// Create a new fault injector with the given RNG.
    #[must_use]
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            configs: Vec::new(),
            injection_counts: Mutex::new(Vec::new()),
        }
    }

    /// Register a fault configuration.
    ///
    /// Registration must happen before sharing via Arc.
    pub fn register(&mut self, config: FaultConfig) {
        self.configs.push(config);
        self.injection_counts
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push(0);
    }

    /// Check if a fault should be injected for the given operation.
    ///
    /// Returns the fault type if one should be injected, None otherwise.
    /// The first matching config that rolls true wins.
    pub fn should_inject(&self, operation: &str) -> Option<FaultType> {
        self.should_inject_matching(operation, |_| true)
    }

    /// Like [`should_inject`](Self::should_inject), but only configs whose
    /// fault type passes `accept` are considered.
    ///
    /// Components sharing one injector use this to ignore faults aimed at
    /// other layers (the catalog never rolls storage faults).
    pub fn should_inject_matching(
        &self,
        operation: &str,
        accept: impl Fn(FaultType) -> bool,
    ) -> Option<FaultType> {
        let mut counts = self
            .injection_counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        for (index, config) in self.configs.iter().enumerate() {
            if !accept(config.fault_type) || !config.matches(operation) {
                continue;
            }

            if let Some(max) = config.max_injections {
                if counts[index] >= max {
                    continue;
                }
            }

            let inject = self
                .rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .next_bool(config.probability);

            if inject {
                counts[index] += 1;
                tracing::debug!(
                    operation,
                    fault = config.fault_type.as_str(),
                    "injecting fault"
                );
                return Some(config.fault_type);
            }
        }

        None
    }

    /// Get injection statistics keyed by fault type name.
    #[must_use]
    pub fn injection_stats(&self) -> HashMap<String, u64> {
        let counts = self
            .injection_counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut stats = HashMap::new();
        for (config, count) in self.configs.iter().zip(counts.iter()) {
            *stats.entry(config.fault_type.as_str().to_string()).or_insert(0) += count;
        }
        stats
    }

    /// Get total number of injections.
    #[must_use]
    pub fn total_injections(&self) -> u64 {
        self.injection_counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .sum()
    }

    /// Reset all statistics (and `max_injections` budgets).
    pub fn reset_stats(&self) {
        let mut counts = self
            .injection_counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        counts.iter_mut().for_each(|count| *count = 0);
    }
}

/// Builder for `FaultInjector`.
///
/// TigerStyle: Configure everything before sharing via Arc.
pub struct FaultInjectorBuilder {
    rng: DeterministicRng,
    configs: Vec<FaultConfig>,
}

impl FaultInjectorBuilder {
    /// Create a new builder with the given RNG.
    #[must_use]
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            rng,
            configs: Vec::new(),
        }
    }

    /// Add a fault configuration.
    #[must_use]
    pub fn with_fault(mut self, config: FaultConfig) -> Self {
        self.configs.push(config);
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

    /// Build the `FaultInjector`.
    #[must_use]
    pub fn build(self) -> FaultInjector {
        let mut injector = FaultInjector::new(self.rng);
        for config in self.configs {
            injector.register(config);
        }
        injector
    }
}
