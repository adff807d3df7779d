//! `HttpCatalogProvider` - Public REST API Client
//!
//! `TigerStyle`: Production provider, feature-gated.
//!
//! Requires the `http` feature flag (on by default):
//! ```toml
//! pokedex = { version = "0.1", features = ["http"] }
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::types::{EvolutionChain, ListPage, ListResponse, PokemonDetail, PokemonListItem, PokemonSpecies};
use super::{decode_body, CatalogError, CatalogProvider, CatalogResult};
use crate::config::PokedexConfig;
use crate::constants::{
    CATALOG_API_BASE_URL_DEFAULT, CATALOG_FULL_INDEX_COUNT_MAX, CATALOG_RESPONSE_BYTES_MAX,
};

/// Catalog provider backed by the public REST API.
///
/// One request per call. No retry, no caching, no auth.
///
/// # Example
///
/// ```rust,ignore
/// use pokedex::catalog::{CatalogProvider, HttpCatalogProvider};
///
/// #[tokio::main]
/// async fn main() {
///     let catalog = HttpCatalogProvider::new();
///     let pikachu = catalog.fetch_detail(25).await.unwrap();
///     println!("{}", pikachu.name);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct HttpCatalogProvider {
    /// HTTP client
    client: reqwest::Client,
    /// API base URL without trailing slash
    base_url: String,
    /// `limit` used for the full name index
    full_index_limit: u32,
}

impl HttpCatalogProvider {
    /// Create a provider for the public API with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: CATALOG_API_BASE_URL_DEFAULT.to_string(),
            full_index_limit: CATALOG_FULL_INDEX_COUNT_MAX,
        }
    }

    /// Create a provider from configuration.
    ///
    /// # Errors
    /// Returns `CatalogError::Transport` if the HTTP client cannot be built.
    pub fn from_config(config: &PokedexConfig) -> CatalogResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CatalogError::transport(&config.api_base_url, e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            full_index_limit: config.full_index_limit,
        })
    }

    /// Point at another API root (mirrors, local fixtures).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a preconfigured client.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn list_url(&self, offset: u32, limit: u32) -> String {
        format!("{}/pokemon?offset={offset}&limit={limit}", self.base_url)
    }

    fn all_names_url(&self) -> String {
        format!("{}/pokemon?limit={}", self.base_url, self.full_index_limit)
    }

    fn detail_url(&self, id: u32) -> String {
        format!("{}/pokemon/{id}", self.base_url)
    }

    /// Detail URL with `name` percent-encoded as a single path segment.
    fn detail_by_name_url(&self, name: &str) -> CatalogResult<String> {
        if name.is_empty() || name == "." || name == ".." {
            return Err(CatalogError::invalid_request(format!(
                "not a pokemon name: {name:?}"
            )));
        }
        let base = format!("{}/pokemon", self.base_url);
        let mut url = reqwest::Url::parse(&base)
            .map_err(|e| CatalogError::invalid_request(format!("bad base url {base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| {
                CatalogError::invalid_request(format!("base url cannot hold a path: {base}"))
            })?
            .push(name);
        Ok(url.into())
    }

    fn species_url(&self, id: u32) -> String {
        format!("{}/pokemon-species/{id}", self.base_url)
    }

    fn evolution_chain_url(&self, chain_id: u32) -> String {
        format!("{}/evolution-chain/{chain_id}", self.base_url)
    }

    /// GET `url` and decode the body into `T`.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> CatalogResult<T> {
        let response = self
            .client
            .get(url)
            .header("content-type", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CatalogError::transport(url, "timed out")
                } else if e.is_connect() {
                    CatalogError::transport(url, "connection failed")
                } else {
                    CatalogError::transport(url, e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url, status = status.as_u16(), "catalog request rejected");
            return Err(CatalogError::http(url, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::transport(url, e.to_string()))?;

        if body.len() > CATALOG_RESPONSE_BYTES_MAX {
            return Err(CatalogError::schema(
                url,
                format!("body of {} bytes exceeds limit", body.len()),
            ));
        }

        decode_body(url, &body)
    }
}

impl Default for HttpCatalogProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalogProvider {
    #[tracing::instrument(skip(self))]
    async fn fetch_list(&self, offset: u32, limit: u32) -> CatalogResult<ListPage> {
        if limit == 0 {
            return Err(CatalogError::invalid_request("limit must be positive"));
        }

        let response: ListResponse = self.get_json(&self.list_url(offset, limit)).await?;
        ListPage::from_response(response)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_detail(&self, id: u32) -> CatalogResult<PokemonDetail> {
        self.get_json(&self.detail_url(id)).await
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_detail_by_name(&self, name: &str) -> CatalogResult<PokemonDetail> {
        let url = self.detail_by_name_url(name)?;
        self.get_json(&url).await
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_all_names(&self) -> CatalogResult<Vec<PokemonListItem>> {
        let response: ListResponse = self.get_json(&self.all_names_url()).await?;
        Ok(ListPage::from_response(response)?.items)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_species(&self, id: u32) -> CatalogResult<PokemonSpecies> {
        self.get_json(&self.species_url(id)).await
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_evolution_chain(&self, chain_id: u32) -> CatalogResult<EvolutionChain> {
        self.get_json(&self.evolution_chain_url(chain_id)).await
    }

    fn name(&self) -> &'static str {
        "http"
    }

    fn is_simulation(&self) -> bool {
        false
    }
}

// =============================================================================
// Tests
// =============================================================================
