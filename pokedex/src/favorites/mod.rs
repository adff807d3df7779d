//! Favorites - Durable Local Favorites
//!
//! TigerStyle: Abstract storage with simulation-first testing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                FavoritesStore                 │
//! │  lazy single-flight open · per-id locks ·     │
//! │  FavoriteEvent broadcast                      │
//! └──────────────────────────────────────────────┘
//!                        │
//!            ┌───────────┴───────────┐
//!            ↓                       ↓
//! ┌────────────────────┐   ┌──────────────────────┐
//! │SimFavoritesBackend │   │SqliteFavoritesBackend│
//! │    (testing)       │   │   (feature sqlite)   │
//! └────────────────────┘   └──────────────────────┘
//! ```

mod backend;
mod error;
mod record;
mod sim;
mod store;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use backend::FavoritesBackend;
pub use error::{StorageError, StorageResult};
pub use record::{validate_pokemon_id, FavoriteEvent, FavoriteRecord};
pub use sim::SimFavoritesBackend;
pub use store::FavoritesStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteFavoritesBackend;
