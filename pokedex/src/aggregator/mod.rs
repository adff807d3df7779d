//! Aggregator - Browse, Search, Favorites and Detail Views
//!
//! TigerStyle: Each view owns its own state and status. A failure in one
//! view never blocks another.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐ ┌────────────┐ ┌───────────────┐ ┌──────────────┐
//! │PagedBrowser│ │SearchIndex │ │ FavoritesView │ │ DetailLoader │
//! └─────┬──────┘ └─────┬──────┘ └───┬───────┬───┘ └──────┬───────┘
//!       │              │            │       │            │
//!       │              │     FavoritesStore │            │
//!       │              │                    ↓            ↓
//!       │              │              ┌──────────────────────┐
//!       │              │              │     CatalogCache     │
//!       │              │              └──────────┬───────────┘
//!       ↓              ↓                         ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │                     CatalogProvider                       │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod browse;
mod cache;
mod detail;
mod favorites;
mod search;

pub use browse::{BrowseSnapshot, PagedBrowser};
pub use cache::CatalogCache;
pub use detail::DetailLoader;
pub use favorites::{FavoritesSnapshot, FavoritesView};
pub use search::{filter_index, is_active, SearchIndex};

use crate::error::PokedexError;

/// Outcome of a view's most recent load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewStatus {
    /// Nothing loaded yet
    #[default]
    Idle,
    /// Last load succeeded completely
    Ready,
    /// Last load failed; whatever resolved is still available
    Failed(PokedexError),
}

impl ViewStatus {
    /// Whether the last load succeeded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// The failure, if the last load failed.
    #[must_use]
    pub fn error(&self) -> Option<&PokedexError> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Idle | Self::Ready => None,
        }
    }
}
