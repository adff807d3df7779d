//! DST - Deterministic Simulation Testing
//!
//! TigerBeetle/FoundationDB-style deterministic simulation testing.
//!
//! A single seed drives every simulated component: the favorites backend
//! stamps records from a [`SimClock`], the simulated catalog synthesizes its
//! data from a [`DeterministicRng`], and both consult one shared
//! [`FaultInjector`].
//!
//! # Usage
//!
//! ```rust
//! use pokedex::dst::{FaultConfig, FaultType, SimConfig, Simulation};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let sim = Simulation::new(SimConfig::with_seed(42))
//!     .with_fault(FaultConfig::new(FaultType::ApiServerError, 1.0).with_filter("catalog.detail[8]"));
//!
//! sim.run(|env| async move {
//!     let dex = env.create_pokedex();
//!     assert!(dex.details().load(8).await.is_err());
//!     assert!(dex.details().load(7).await.is_ok());
//!     Ok::<(), anyhow::Error>(())
//! })
//! .await
//! .unwrap();
//! # }
//! ```
//!
//! Run with explicit seed for reproducibility:
//! ```bash
//! DST_SEED=12345 cargo test
//! ```

mod clock;
mod config;
mod fault;
mod rng;
mod simulation;

pub use clock::SimClock;
pub use config::{SimConfig, DST_SEED_ENV};
pub use fault::{FaultConfig, FaultInjector, FaultInjectorBuilder, FaultType};
pub use rng::DeterministicRng;
pub use simulation::{create_simulation, SimEnvironment, Simulation};
