//! Catalog - Remote Catalog Client
//!
//! TigerStyle: Provider trait with a simulation implementation and a
//! feature-gated HTTP implementation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               CatalogProvider                 │
//! │ list · detail · all names · species · chain   │
//! └──────────────────────────────────────────────┘
//!            ↑                        ↑
//! ┌──────────┴─────────┐   ┌──────────┴──────────┐
//! │ SimCatalogProvider │   │ HttpCatalogProvider │
//! │    (testing)       │   │   (feature http)    │
//! └────────────────────┘   └─────────────────────┘
//! ```
//!
//! Every response is decoded into the typed schemas in [`types`]; a body
//! that does not match is a [`CatalogError::Schema`], never a partially
//! filled value. There is no automatic retry at this layer.

pub mod display;
mod sim;
pub mod types;
mod url;

#[cfg(feature = "http")]
mod http;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use sim::{RequestStats, SimCatalogProvider};
pub use types::{
    AbilitySlot, ArtworkSprites, ChainLink, ChainReference, EvolutionChain, EvolutionDetail,
    EvolutionStage, FavoritePokemonItem, FlavorTextEntry, Genus, ListPage, ListResponse,
    NamedResource, OtherSprites, PokemonDetail, PokemonFullData, PokemonListItem, PokemonSpecies,
    Sprites, StatEntry, TypeSlot,
};
pub use url::{artwork_url, extract_id, resource_url, sprite_url};

#[cfg(feature = "http")]
pub use http::HttpCatalogProvider;

// =============================================================================
// Error Types
// =============================================================================

/// Errors from catalog requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Http {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Request never produced a response
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Requested URL
        url: String,
        /// Transport error message
        message: String,
    },

    /// Response body did not match the expected schema
    #[error("unexpected response from {url}: {message}")]
    Schema {
        /// Requested URL
        url: String,
        /// Decoding error message
        message: String,
    },

    /// Resource URL does not end in a numeric id
    #[error("no numeric id at end of url: {url}")]
    MalformedUrl {
        /// Offending URL
        url: String,
    },

    /// Request arguments rejected before anything was sent
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// What was wrong
        message: String,
    },

    /// Simulated fault with no network equivalent (for DST)
    #[error("simulated fault: {fault_type} during {operation}")]
    SimulatedFault {
        /// Operation that failed
        operation: String,
        /// Type of simulated fault
        fault_type: String,
    },
}

impl CatalogError {
    /// Create an HTTP status error.
    #[must_use]
    pub fn http(url: impl Into<String>, status: u16) -> Self {
        Self::Http {
            url: url.into(),
            status,
        }
    }

    /// Create a transport error.
    #[must_use]
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a schema error.
    #[must_use]
    pub fn schema(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a malformed URL error.
    #[must_use]
    pub fn malformed_url(url: impl Into<String>) -> Self {
        Self::MalformedUrl { url: url.into() }
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a simulated fault error.
    #[must_use]
    pub fn simulated_fault(operation: impl Into<String>, fault_type: impl Into<String>) -> Self {
        Self::SimulatedFault {
            operation: operation.into(),
            fault_type: fault_type.into(),
        }
    }

    /// Check if repeating the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            Self::Transport { .. } | Self::SimulatedFault { .. } => true,
            Self::Schema { .. } | Self::MalformedUrl { .. } | Self::InvalidRequest { .. } => false,
        }
    }

    /// The URL involved, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Http { url, .. }
            | Self::Transport { url, .. }
            | Self::Schema { url, .. }
            | Self::MalformedUrl { url } => Some(url),
            Self::InvalidRequest { .. } | Self::SimulatedFault { .. } => None,
        }
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Decode a response body into `T`.
///
/// # Errors
/// Returns `CatalogError::Schema` if the body is not valid JSON for `T`.
pub fn decode_body<T: DeserializeOwned>(url: &str, body: &str) -> CatalogResult<T> {
    serde_json::from_str(body).map_err(|e| CatalogError::schema(url, e.to_string()))
}

/// Decode an already parsed JSON value into `T`.
///
/// # Errors
/// Returns `CatalogError::Schema` if the value does not match `T`.
pub fn decode_value<T: DeserializeOwned>(url: &str, value: serde_json::Value) -> CatalogResult<T> {
    serde_json::from_value(value).map_err(|e| CatalogError::schema(url, e.to_string()))
}

// =============================================================================
// CatalogProvider Trait
// =============================================================================

/// Read-only access to the remote catalog.
///
/// Implementations:
/// - `SimCatalogProvider`: deterministic fixture data with fault injection
/// - `HttpCatalogProvider`: the public REST API (feature `http`)
#[async_trait]
pub trait CatalogProvider: Send + Sync + std::fmt::Debug {
    /// Fetch one page of `{ id, name }` entries starting at `offset`.
    ///
    /// A `limit` of 0 is rejected with [`CatalogError::InvalidRequest`].
    /// `has_more` reports whether the server advertised a next page.
    /// Callers advance by a fixed stride and never follow `next`.
    async fn fetch_list(&self, offset: u32, limit: u32) -> CatalogResult<ListPage>;

    /// Fetch full detail for one Pokémon by id.
    async fn fetch_detail(&self, id: u32) -> CatalogResult<PokemonDetail>;

    /// Fetch full detail for one Pokémon by name.
    async fn fetch_detail_by_name(&self, name: &str) -> CatalogResult<PokemonDetail>;

    /// Fetch the whole name index in one unpaginated request.
    async fn fetch_all_names(&self) -> CatalogResult<Vec<PokemonListItem>>;

    /// Fetch species data (flavor text, genus, evolution chain link).
    async fn fetch_species(&self, id: u32) -> CatalogResult<PokemonSpecies>;

    /// Fetch an evolution chain by its own id.
    async fn fetch_evolution_chain(&self, chain_id: u32) -> CatalogResult<EvolutionChain>;

    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Whether this provider serves simulated data.
    fn is_simulation(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(CatalogError::http("u", 503).is_retryable());
        assert!(CatalogError::http("u", 429).is_retryable());
        assert!(CatalogError::transport("u", "reset").is_retryable());

        assert!(!CatalogError::http("u", 404).is_retryable());
        assert!(!CatalogError::schema("u", "missing field `name`").is_retryable());
        assert!(!CatalogError::malformed_url("u").is_retryable());
        assert!(!CatalogError::invalid_request("limit must be positive").is_retryable());
    }

    #[test]
    fn test_error_url() {
        let err = CatalogError::http("https://pokeapi.co/api/v2/pokemon/9999", 404);
        assert_eq!(err.url(), Some("https://pokeapi.co/api/v2/pokemon/9999"));
        assert_eq!(err.to_string(), "HTTP 404 from https://pokeapi.co/api/v2/pokemon/9999");
        assert_eq!(CatalogError::simulated_fault("catalog.list", "x").url(), None);
    }

    #[test]
    fn test_decode_body_schema_error() {
        let err = decode_body::<NamedResource>("https://x/1", r#"{"name":"bulbasaur"}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Schema { ref message, .. } if message.contains("url")));

        let err = decode_body::<NamedResource>("https://x/1", "not json").unwrap_err();
        assert!(matches!(err, CatalogError::Schema { .. }));
    }
}
