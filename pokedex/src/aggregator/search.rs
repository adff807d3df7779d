//! SearchIndex - In-Memory Name/Number Search
//!
//! `TigerStyle`: The full name index is fetched once, on the first active
//! query, and filtered locally afterwards.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::catalog::{CatalogProvider, PokemonListItem};
use crate::constants::SEARCH_QUERY_BYTES_MAX;
use crate::error::{PokedexError, PokedexResult};

/// Whether `query` should run a search at all.
#[must_use]
pub fn is_active(query: &str) -> bool {
    !query.trim().is_empty()
}

/// Entries whose name or decimal id contains the normalized query.
///
/// The query is trimmed and lower-cased; names compare case-insensitively.
/// Index order is preserved.
#[must_use]
pub fn filter_index(index: &[PokemonListItem], query: &str) -> Vec<PokemonListItem> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    index
        .iter()
        .filter(|item| {
            item.name.to_lowercase().contains(&needle) || item.id.to_string().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Search over the whole catalog.
#[derive(Debug)]
pub struct SearchIndex {
    catalog: Arc<dyn CatalogProvider>,
    index: OnceCell<Arc<Vec<PokemonListItem>>>,
}

impl SearchIndex {
    /// Create an index that loads on first use.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self {
            catalog,
            index: OnceCell::new(),
        }
    }

    /// Search for `query`.
    ///
    /// An inactive (blank) query returns nothing and does not load the
    /// index. Queries over `SEARCH_QUERY_BYTES_MAX` bytes match nothing.
    ///
    /// # Errors
    /// Returns the catalog error if the index has to be loaded and the load
    /// fails; the next active query tries again.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> PokedexResult<Vec<PokemonListItem>> {
        if !is_active(query) || query.trim().len() > SEARCH_QUERY_BYTES_MAX {
            return Ok(Vec::new());
        }

        let index = self.index().await?;
        let matches = filter_index(&index, query);
        tracing::debug!(matches = matches.len(), "search finished");
        Ok(matches)
    }

    /// Load the full index now.
    ///
    /// # Errors
    /// Returns the catalog error; nothing is cached on failure.
    pub async fn preload(&self) -> PokedexResult<usize> {
        Ok(self.index().await?.len())
    }

    /// Whether the full index is loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.index.initialized()
    }

    async fn index(&self) -> PokedexResult<Arc<Vec<PokemonListItem>>> {
        let index = self
            .index
            .get_or_try_init(|| async {
                tracing::debug!("loading full name index");
                let items = self.catalog.fetch_all_names().await.map_err(|e| {
                    tracing::warn!(error = %e, "name index failed to load");
                    e
                })?;
                Ok::<_, PokedexError>(Arc::new(items))
            })
            .await?;
        Ok(Arc::clone(index))
    }
}
