//! Resource URL helpers.

use super::{CatalogError, CatalogResult};

/// Extract the trailing numeric id from a resource URL.
///
/// Accepts `.../<id>/` and `.../<id>`; the id must be a positive integer
/// preceded by a `/`.
///
/// # Errors
/// Returns `CatalogError::MalformedUrl` otherwise.
///
/// # Example
/// ```
/// use pokedex::catalog::extract_id;
/// assert_eq!(extract_id("https://pokeapi.co/api/v2/pokemon/25/").unwrap(), 25);
/// assert!(extract_id("https://pokeapi.co/api/v2/pokemon/").is_err());
/// ```
pub fn extract_id(url: &str) -> CatalogResult<u32> {
    let trimmed = url.strip_suffix('/').unwrap_or(url);

    let (_, segment) = trimmed
        .rsplit_once('/')
        .ok_or_else(|| CatalogError::malformed_url(url))?;

    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CatalogError::malformed_url(url));
    }

    segment
        .parse::<u32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| CatalogError::malformed_url(url))
}

/// Canonical URL of a catalog resource, e.g. `{base}/pokemon/25/`.
#[must_use]
pub fn resource_url(api_base: &str, kind: &str, id: u32) -> String {
    format!("{}/{kind}/{id}/", api_base.trim_end_matches('/'))
}

/// Small front sprite image URL.
#[must_use]
pub fn sprite_url(sprites_base: &str, id: u32) -> String {
    format!("{}/{id}.png", sprites_base.trim_end_matches('/'))
}

/// Official artwork image URL.
#[must_use]
pub fn artwork_url(sprites_base: &str, id: u32) -> String {
    format!(
        "{}/other/official-artwork/{id}.png",
        sprites_base.trim_end_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CATALOG_API_BASE_URL_DEFAULT, CATALOG_SPRITES_BASE_URL_DEFAULT};

    #[test]
    fn test_extract_id_with_and_without_slash() {
        assert_eq!(
            extract_id("https://pokeapi.co/api/v2/pokemon/25/").unwrap(),
            25
        );
        assert_eq!(
            extract_id("https://pokeapi.co/api/v2/pokemon-species/1").unwrap(),
            1
        );
        assert_eq!(
            extract_id("https://pokeapi.co/api/v2/evolution-chain/67/").unwrap(),
            67
        );
    }

    #[test]
    fn test_extract_id_rejects_malformed() {
        for url in [
            "https://pokeapi.co/api/v2/pokemon/",
            "https://pokeapi.co/api/v2/pokemon/pikachu/",
            "https://pokeapi.co/api/v2/pokemon/25a/",
            "https://pokeapi.co/api/v2/pokemon/0/",
            "https://pokeapi.co/api/v2/pokemon/-3/",
            "https://pokeapi.co/api/v2/pokemon/99999999999/",
            "25",
            "",
        ] {
            let err = extract_id(url).unwrap_err();
            assert_eq!(err, CatalogError::malformed_url(url), "url: {url}");
        }
    }

    #[test]
    fn test_resource_url_round_trips_through_extract() {
        let url = resource_url(CATALOG_API_BASE_URL_DEFAULT, "pokemon-species", 133);
        assert_eq!(url, "https://pokeapi.co/api/v2/pokemon-species/133/");
        assert_eq!(extract_id(&url).unwrap(), 133);
    }

    #[test]
    fn test_image_urls() {
        assert_eq!(
            sprite_url(CATALOG_SPRITES_BASE_URL_DEFAULT, 25),
            "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/25.png"
        );
        assert_eq!(
            artwork_url(CATALOG_SPRITES_BASE_URL_DEFAULT, 25),
            "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork/25.png"
        );
    }
}
