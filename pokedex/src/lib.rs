//! # Pokédex
//!
//! The non-UI core of a Pokédex: a local favorites store, a typed client for
//! the public Pokémon catalog API, and the list, search, favorites and detail
//! views built on top of them, with deterministic simulation testing.
//!
//! ## Features
//!
//! - **Favorites store**: idempotent add/remove, atomic toggle, ordered by
//!   recency, persisted in SQLite and opened lazily on first use
//! - **Catalog client**: typed decoding of every response; schema drift is an
//!   error, never a half-filled value
//! - **Views**: infinite-scroll browse, in-memory search over the full name
//!   index, favorites resolved against the catalog with partial failure
//! - **Deterministic testing**: simulated catalog and store driven by one seed,
//!   with fault injection on both
//!
//! ## Quick Start
//!
//! ```rust
//! use pokedex::Pokedex;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), pokedex::PokedexError> {
//! // Simulated catalog and favorites (deterministic, seed 42)
//! let dex = Pokedex::sim(42);
//!
//! dex.browser().load_next_page().await?;
//! assert_eq!(dex.browser().items()[0].name, "bulbasaur");
//!
//! let hits = dex.search().search("char").await?;
//! assert_eq!(hits.len(), 3);
//!
//! dex.toggle_favorite(25).await?;
//! let favorites = dex.favorites_view().load().await;
//! assert_eq!(favorites.items[0].id, 25);
//!
//! let full = dex.details().load(133).await?;
//! assert_eq!(full.evolution_chain.stages()?.len(), 4);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                        Pokedex                          │
//! ├─────────────────────────────────────────────────────────┤
//! │ PagedBrowser │ SearchIndex │ FavoritesView │ DetailLoader│
//! ├─────────────────────────────────────────────────────────┤
//! │  CatalogProvider (HTTP | Sim)  │  FavoritesStore        │
//! │                                │  (SQLite | Sim backend)│
//! ├─────────────────────────────────────────────────────────┤
//! │  DST Framework           │ Fault injection + simulation │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Feature Flags
//!
//! - `sqlite` - SQLite favorites backend (default)
//! - `http` - HTTP catalog client (default)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod dex;
pub mod dst;
pub mod error;
pub mod favorites;
pub mod telemetry;

// Re-export common types
pub use constants::*;
pub use dst::{
    create_simulation, DeterministicRng, FaultConfig, FaultInjector, FaultType, SimClock,
    SimConfig, SimEnvironment, Simulation,
};

// Orchestrator (main API)
pub use config::{ConfigError, PokedexConfig};
pub use dex::{Pokedex, PokedexBuilder};
pub use error::{PokedexError, PokedexResult};

// Favorites
pub use favorites::{FavoriteEvent, FavoriteRecord, FavoritesBackend, FavoritesStore, StorageError};

#[cfg(feature = "sqlite")]
pub use favorites::SqliteFavoritesBackend;

// Catalog
pub use catalog::{
    CatalogError, CatalogProvider, EvolutionChain, ListPage, PokemonDetail, PokemonFullData,
    PokemonListItem, PokemonSpecies, SimCatalogProvider,
};

#[cfg(feature = "http")]
pub use catalog::HttpCatalogProvider;

// Views
pub use aggregator::{
    DetailLoader, FavoritesSnapshot, FavoritesView, PagedBrowser, SearchIndex, ViewStatus,
};

// Telemetry
pub use telemetry::{init_telemetry, TelemetryConfig, TelemetryError};
