//! Pokédex Configuration
//!
//! `TigerStyle`: Sensible defaults, builder pattern, explicit over implicit.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::constants::{
    BROWSE_PREFETCH_THRESHOLD_COUNT_DEFAULT, CATALOG_API_BASE_URL_DEFAULT,
    CATALOG_FULL_INDEX_COUNT_MAX, CATALOG_PAGE_SIZE_DEFAULT, CATALOG_PAGE_SIZE_MAX,
    CATALOG_SPRITES_BASE_URL_DEFAULT, FAVORITES_DB_PATH_DEFAULT,
};

/// Environment variable overriding [`PokedexConfig::api_base_url`].
pub const ENV_API_BASE_URL: &str = "POKEDEX_API_BASE_URL";
/// Environment variable overriding [`PokedexConfig::sprites_base_url`].
pub const ENV_SPRITES_BASE_URL: &str = "POKEDEX_SPRITES_BASE_URL";
/// Environment variable overriding [`PokedexConfig::page_size`].
pub const ENV_PAGE_SIZE: &str = "POKEDEX_PAGE_SIZE";
/// Environment variable overriding [`PokedexConfig::database_path`].
pub const ENV_DATABASE_PATH: &str = "POKEDEX_DATABASE_PATH";
/// Environment variable setting [`PokedexConfig::request_timeout`] in milliseconds.
pub const ENV_REQUEST_TIMEOUT_MS: &str = "POKEDEX_REQUEST_TIMEOUT_MS";

// =============================================================================
// Errors
// =============================================================================

/// Errors from loading or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv {
        /// Variable name
        key: String,
        /// Raw value
        value: String,
    },

    /// Page size outside the accepted range
    #[error("invalid page size: {value} (must be 1-{max})")]
    InvalidPageSize {
        /// Provided value
        value: u32,
        /// Maximum allowed
        max: u32,
    },

    /// A base URL is empty
    #[error("{field} must not be empty")]
    EmptyUrl {
        /// Offending field
        field: &'static str,
    },

    /// The favorites database path is empty
    #[error("database_path must not be empty")]
    EmptyDatabasePath,
}

// =============================================================================
// PokedexConfig
// =============================================================================

/// Configuration for a [`Pokedex`](crate::dex::Pokedex).
///
/// `TigerStyle`:
/// - Sensible defaults via Default impl
/// - Builder pattern for customization
/// - All fields public for transparency
///
/// # Example
///
/// ```rust
/// use pokedex::config::PokedexConfig;
///
/// let config = PokedexConfig::default()
///     .with_page_size(20)
///     .with_database_path("/tmp/dex.db");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokedexConfig {
    /// Catalog API root.
    ///
    /// Default: `https://pokeapi.co/api/v2`
    pub api_base_url: String,

    /// Sprite image root.
    ///
    /// Default: the PokeAPI sprites repository
    pub sprites_base_url: String,

    /// Entries per browse page, also the stride between page offsets.
    ///
    /// Default: 50
    pub page_size: u32,

    /// `limit` used to fetch the whole name index.
    ///
    /// Default: 2000
    pub full_index_limit: u32,

    /// Distance from the end of the loaded list that triggers the next page.
    ///
    /// Default: 10
    pub prefetch_threshold: usize,

    /// Favorites database file.
    ///
    /// Default: `pokedex.db`
    pub database_path: PathBuf,

    /// Per-request HTTP timeout.
    ///
    /// Default: none
    pub request_timeout: Option<Duration>,
}

impl Default for PokedexConfig {
    fn default() -> Self {
        Self {
            api_base_url: CATALOG_API_BASE_URL_DEFAULT.to_string(),
            sprites_base_url: CATALOG_SPRITES_BASE_URL_DEFAULT.to_string(),
            page_size: CATALOG_PAGE_SIZE_DEFAULT,
            full_index_limit: CATALOG_FULL_INDEX_COUNT_MAX,
            prefetch_threshold: BROWSE_PREFETCH_THRESHOLD_COUNT_DEFAULT,
            database_path: PathBuf::from(FAVORITES_DB_PATH_DEFAULT),
            request_timeout: None,
        }
    }
}

impl PokedexConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `POKEDEX_*` environment variables.
    ///
    /// # Errors
    /// Returns `ConfigError` if a variable is set but unparsable, or if the
    /// result fails [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an explicit variable source.
    ///
    /// # Errors
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_BASE_URL) {
            config.api_base_url = url;
        }
        if let Some(url) = lookup(ENV_SPRITES_BASE_URL) {
            config.sprites_base_url = url;
        }
        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            config.page_size = parse_env(ENV_PAGE_SIZE, &raw)?;
        }
        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            let ms: u64 = parse_env(ENV_REQUEST_TIMEOUT_MS, &raw)?;
            config.request_timeout = Some(Duration::from_millis(ms));
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants.
    ///
    /// # Errors
    /// Returns `ConfigError` on an out-of-range page size, an empty URL or
    /// an empty database path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.page_size > CATALOG_PAGE_SIZE_MAX {
            return Err(ConfigError::InvalidPageSize {
                value: self.page_size,
                max: CATALOG_PAGE_SIZE_MAX,
            });
        }
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl {
                field: "api_base_url",
            });
        }
        if self.sprites_base_url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl {
                field: "sprites_base_url",
            });
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        Ok(())
    }

    /// Set the catalog API root.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the sprite image root.
    #[must_use]
    pub fn with_sprites_base_url(mut self, url: impl Into<String>) -> Self {
        self.sprites_base_url = url.into();
        self
    }

    /// Set the browse page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the full name index limit.
    #[must_use]
    pub fn with_full_index_limit(mut self, limit: u32) -> Self {
        self.full_index_limit = limit;
        self
    }

    /// Set the browse prefetch threshold.
    #[must_use]
    pub fn with_prefetch_threshold(mut self, threshold: usize) -> Self {
        self.prefetch_threshold = threshold;
        self
    }

    /// Set the favorites database file.
    #[must_use]
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Set the per-request HTTP timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PokedexConfig::default();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.full_index_limit, 2000);
        assert_eq!(config.prefetch_threshold, 10);
        assert_eq!(config.database_path, PathBuf::from("pokedex.db"));
        assert_eq!(config.request_timeout, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = PokedexConfig::new()
            .with_api_base_url("http://localhost:8000/api/v2")
            .with_page_size(25)
            .with_prefetch_threshold(3)
            .with_request_timeout(Duration::from_secs(5));
        assert_eq!(config.api_base_url, "http://localhost:8000/api/v2");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.prefetch_threshold, 3);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = PokedexConfig::from_lookup(lookup(&[
            (ENV_PAGE_SIZE, "20"),
            (ENV_DATABASE_PATH, "/var/lib/dex.db"),
            (ENV_REQUEST_TIMEOUT_MS, "1500"),
        ]))
        .unwrap();

        assert_eq!(config.page_size, 20);
        assert_eq!(config.database_path, PathBuf::from("/var/lib/dex.db"));
        assert_eq!(config.request_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.api_base_url, CATALOG_API_BASE_URL_DEFAULT);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = PokedexConfig::from_lookup(lookup(&[(ENV_PAGE_SIZE, "fifty")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnv {
                key: ENV_PAGE_SIZE.to_string(),
                value: "fifty".to_string(),
            }
        );

        let err = PokedexConfig::from_lookup(lookup(&[(ENV_PAGE_SIZE, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPageSize { value: 0, .. }));
    }

    #[test]
    fn test_validate_limits() {
        assert!(PokedexConfig::default().with_page_size(CATALOG_PAGE_SIZE_MAX).validate().is_ok());
        assert!(PokedexConfig::default().with_page_size(CATALOG_PAGE_SIZE_MAX + 1).validate().is_err());
        assert_eq!(
            PokedexConfig::default().with_api_base_url(" ").validate(),
            Err(ConfigError::EmptyUrl { field: "api_base_url" })
        );
    }

    #[test]
    fn test_empty_database_path_rejected() {
        assert_eq!(
            PokedexConfig::default().with_database_path("").validate(),
            Err(ConfigError::EmptyDatabasePath)
        );
        assert_eq!(
            PokedexConfig::from_lookup(lookup(&[(ENV_DATABASE_PATH, "")])),
            Err(ConfigError::EmptyDatabasePath)
        );
    }
}
