//! Pokédex Errors
//!
//! `TigerStyle`: One error type at the orchestration boundary, wrapping the
//! layer errors unchanged.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::favorites::StorageError;

/// Errors surfaced by [`Pokedex`](crate::dex::Pokedex) and its views.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PokedexError {
    /// Remote catalog request failed
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Favorites storage failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A required component was not supplied to the builder
    #[error("missing component: {component}")]
    MissingComponent {
        /// Component name
        component: &'static str,
    },
}

impl PokedexError {
    /// Create a missing component error.
    #[must_use]
    pub fn missing_component(component: &'static str) -> Self {
        Self::MissingComponent { component }
    }

    /// Check if retrying the same operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Catalog(e) => e.is_retryable(),
            Self::Storage(e) => e.is_transient(),
            Self::Config(_) | Self::MissingComponent { .. } => false,
        }
    }
}

/// Result type for Pokédex operations.
pub type PokedexResult<T> = Result<T, PokedexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_layer_errors() {
        let err: PokedexError = CatalogError::http("https://x/pokemon/8", 503).into();
        assert!(matches!(err, PokedexError::Catalog(_)));
        assert!(err.is_retryable());

        let err: PokedexError = StorageError::validation("pokemon_id must be positive").into();
        assert!(matches!(err, PokedexError::Storage(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_missing_component_display() {
        let err = PokedexError::missing_component("catalog");
        assert_eq!(err.to_string(), "missing component: catalog");
        assert!(!err.is_retryable());
    }
}
