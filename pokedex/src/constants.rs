//! `TigerStyle` Constants
//!
//! All limits use big-endian naming: `CATEGORY_SPECIFICS_UNIT_LIMIT`
//! Example: `CATALOG_PAGE_SIZE_MAX` (not `MAX_PAGE_SIZE`)
//!
//! Every constant includes units in the name:
//! - _`COUNT_MAX` for quantity limits
//! - _`BYTES_MAX` for size limits
//! - _MS for milliseconds
//! - _DEFAULT for configurable defaults

// =============================================================================
// Remote Catalog
// =============================================================================

/// Base URL of the public catalog API
pub const CATALOG_API_BASE_URL_DEFAULT: &str = "https://pokeapi.co/api/v2";

/// Base URL of the sprite image repository
pub const CATALOG_SPRITES_BASE_URL_DEFAULT: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Entries requested per browse page
pub const CATALOG_PAGE_SIZE_DEFAULT: u32 = 50;

/// Largest page the client will request
pub const CATALOG_PAGE_SIZE_MAX: u32 = 200;

/// Limit used to fetch the whole name index in one request.
///
/// The remote dataset holds roughly 1300 entries.
pub const CATALOG_FULL_INDEX_COUNT_MAX: u32 = 2000;

/// Maximum accepted response body size
pub const CATALOG_RESPONSE_BYTES_MAX: usize = 4 * 1024 * 1024; // 4MB

// =============================================================================
// Favorites Store
// =============================================================================

/// Default database file name
pub const FAVORITES_DB_PATH_DEFAULT: &str = "pokedex.db";

/// Connections held by the SQLite pool (one long-lived handle)
pub const FAVORITES_DB_CONNECTIONS_COUNT: u32 = 1;

/// Capacity of the change notification channel
pub const FAVORITES_EVENT_CHANNEL_COUNT_MAX: usize = 256;

// =============================================================================
// Aggregator
// =============================================================================

/// Items from the end of the loaded list at which the next page is requested
pub const BROWSE_PREFETCH_THRESHOLD_COUNT_DEFAULT: usize = 10;

/// Maximum accepted search query length
pub const SEARCH_QUERY_BYTES_MAX: usize = 256;

// =============================================================================
// Display
// =============================================================================

/// Highest possible base stat value
pub const STAT_BASE_VALUE_MAX: u32 = 255;

/// Digits in a zero-padded display number
pub const DISPLAY_ID_DIGITS_COUNT: usize = 3;

/// Language used for flavor text and genus lookups
pub const DISPLAY_LANGUAGE_DEFAULT: &str = "en";

// =============================================================================
// DST (Deterministic Simulation Testing)
// =============================================================================

/// Maximum simulation steps
pub const DST_SIMULATION_STEPS_MAX: u64 = 1_000_000;

/// Maximum fault injection probability
pub const DST_FAULT_PROBABILITY_MAX: f64 = 1.0;

/// Maximum time advance in a single step
pub const DST_TIME_ADVANCE_MS_MAX: u64 = 86_400_000; // 24 hours

/// Number of species in the simulated catalog fixture
pub const DST_CATALOG_SPECIES_COUNT: u32 = 151;

// =============================================================================
// Time
// =============================================================================

/// Milliseconds per second
pub const TIME_MS_PER_SEC: u64 = 1000;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_limits() {
        assert!(CATALOG_PAGE_SIZE_DEFAULT > 0);
        assert!(CATALOG_PAGE_SIZE_DEFAULT <= CATALOG_PAGE_SIZE_MAX);
        assert!(CATALOG_PAGE_SIZE_MAX < CATALOG_FULL_INDEX_COUNT_MAX);
    }

    #[test]
    fn test_base_urls_have_no_trailing_slash() {
        assert!(!CATALOG_API_BASE_URL_DEFAULT.ends_with('/'));
        assert!(!CATALOG_SPRITES_BASE_URL_DEFAULT.ends_with('/'));
    }

    #[test]
    fn test_sqlite_single_connection() {
        assert_eq!(FAVORITES_DB_CONNECTIONS_COUNT, 1);
    }

    #[test]
    fn test_fixture_fits_two_pages() {
        assert!(DST_CATALOG_SPECIES_COUNT > 2 * CATALOG_PAGE_SIZE_DEFAULT);
    }
}
