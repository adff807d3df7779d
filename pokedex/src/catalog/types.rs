//! Catalog Schemas
//!
//! `TigerStyle`: Responses are validated by deserialization.
//!
//! Keys the API sends as `null` are modelled as `Option` but must still be
//! present (routed through `nullable`). Keys the API may omit use `#[serde(default)]`.
//! Unknown keys are ignored.

use serde::{Deserialize, Deserializer, Serialize};

use super::url::extract_id;
use super::CatalogResult;

/// Deserialize a key that must be present but may be `null`.
///
/// Plain `Option` fields treat a missing key as `None`; routing the field
/// through `deserialize_with` makes serde report the key as missing instead.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

// =============================================================================
// Shared
// =============================================================================

/// A `{ name, url }` reference to another resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    /// Resource name (lowercase, hyphenated)
    pub name: String,
    /// Canonical resource URL ending in the resource id
    pub url: String,
}

impl NamedResource {
    /// Id taken from the end of `url`.
    ///
    /// # Errors
    /// Returns `CatalogError::MalformedUrl` if the URL has no trailing id.
    pub fn id(&self) -> CatalogResult<u32> {
        extract_id(&self.url)
    }
}

// =============================================================================
// List
// =============================================================================

/// Raw paginated list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    /// Total number of entries on the server
    pub count: u32,
    /// Next page URL, `null` on the last page
    #[serde(deserialize_with = "nullable")]
    pub next: Option<String>,
    /// Previous page URL, `null` on the first page
    #[serde(deserialize_with = "nullable")]
    pub previous: Option<String>,
    /// Entries on this page
    pub results: Vec<NamedResource>,
}

/// A browsable `{ id, name }` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PokemonListItem {
    /// Catalog id
    pub id: u32,
    /// Lowercase name
    pub name: String,
}

/// An entry of the favorites view.
pub type FavoritePokemonItem = PokemonListItem;

/// One decoded page of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage {
    /// Entries in server order
    pub items: Vec<PokemonListItem>,
    /// Whether the server advertised another page
    pub has_more: bool,
    /// Total number of entries on the server
    pub total: u32,
}

impl ListPage {
    /// Convert a raw list response, extracting each entry's id from its URL.
    ///
    /// # Errors
    /// Returns `CatalogError::MalformedUrl` if any entry URL lacks an id.
    pub fn from_response(response: ListResponse) -> CatalogResult<Self> {
        let items = response
            .results
            .into_iter()
            .map(|entry| {
                Ok(PokemonListItem {
                    id: entry.id()?,
                    name: entry.name,
                })
            })
            .collect::<CatalogResult<Vec<_>>>()?;

        Ok(Self {
            items,
            has_more: response.next.is_some(),
            total: response.count,
        })
    }
}

// =============================================================================
// Detail
// =============================================================================

/// A type slot (`slot` 1 is the primary type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSlot {
    /// Slot position
    pub slot: u32,
    /// The type
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

/// A base stat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEntry {
    /// Base value (0..=255)
    pub base_stat: u32,
    /// Effort value yield
    pub effort: u32,
    /// The stat
    pub stat: NamedResource,
}

/// An ability slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySlot {
    /// The ability
    pub ability: NamedResource,
    /// Hidden abilities are excluded from display
    pub is_hidden: bool,
    /// Slot position
    pub slot: u32,
}

/// Official artwork images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkSprites {
    /// Default artwork
    #[serde(deserialize_with = "nullable")]
    pub front_default: Option<String>,
    /// Shiny artwork
    #[serde(deserialize_with = "nullable")]
    pub front_shiny: Option<String>,
}

/// Alternative sprite sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherSprites {
    /// Official artwork, when published
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<ArtworkSprites>,
}

/// Sprite image URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    /// Front sprite
    #[serde(deserialize_with = "nullable")]
    pub front_default: Option<String>,
    /// Shiny front sprite
    #[serde(deserialize_with = "nullable")]
    pub front_shiny: Option<String>,
    /// Back sprite
    #[serde(deserialize_with = "nullable")]
    pub back_default: Option<String>,
    /// Shiny back sprite
    #[serde(deserialize_with = "nullable")]
    pub back_shiny: Option<String>,
    /// Alternative sets
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

/// Full detail of one Pokémon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonDetail {
    /// Catalog id
    pub id: u32,
    /// Lowercase name
    pub name: String,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    /// Base experience yield, unknown for some entries
    #[serde(deserialize_with = "nullable")]
    pub base_experience: Option<u32>,
    /// Types in slot order
    pub types: Vec<TypeSlot>,
    /// Base stats
    pub stats: Vec<StatEntry>,
    /// Abilities including hidden ones
    pub abilities: Vec<AbilitySlot>,
    /// Images
    pub sprites: Sprites,
    /// Species reference
    pub species: NamedResource,
}

// =============================================================================
// Species
// =============================================================================

/// Link from a species to its evolution chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainReference {
    /// Evolution chain URL ending in the chain id
    pub url: String,
}

/// A localized flavor text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorTextEntry {
    /// Raw text (may contain line and form feeds)
    pub flavor_text: String,
    /// Language of the text
    pub language: NamedResource,
    /// Game version the text comes from
    pub version: NamedResource,
}

/// A localized genus ("Seed Pokémon").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genus {
    /// The genus
    pub genus: String,
    /// Language of the genus
    pub language: NamedResource,
}

/// Species data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonSpecies {
    /// Species id
    pub id: u32,
    /// Lowercase name
    pub name: String,
    /// Evolution chain link
    pub evolution_chain: ChainReference,
    /// Flavor texts across languages and versions
    pub flavor_text_entries: Vec<FlavorTextEntry>,
    /// Genera across languages
    pub genera: Vec<Genus>,
}

impl PokemonSpecies {
    /// Id of this species' evolution chain.
    ///
    /// # Errors
    /// Returns `CatalogError::MalformedUrl` if the chain URL lacks an id.
    pub fn evolution_chain_id(&self) -> CatalogResult<u32> {
        extract_id(&self.evolution_chain.url)
    }
}

// =============================================================================
// Evolution
// =============================================================================

/// Conditions for one evolution edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionDetail {
    /// Minimum level, if level-based
    #[serde(deserialize_with = "nullable")]
    pub min_level: Option<u32>,
    /// Trigger ("level-up", "use-item", ...)
    #[serde(deserialize_with = "nullable")]
    pub trigger: Option<NamedResource>,
    /// Item required, if any
    #[serde(deserialize_with = "nullable")]
    pub item: Option<NamedResource>,
}

/// A node of the evolution tree. Each node owns its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    /// Species at this node
    pub species: NamedResource,
    /// Conditions to reach this node from its parent (empty at the root)
    pub evolution_details: Vec<EvolutionDetail>,
    /// Children in source order
    pub evolves_to: Vec<ChainLink>,
}

/// An evolution chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionChain {
    /// Chain id
    pub id: u32,
    /// Root node
    pub chain: ChainLink,
}

/// One species of a flattened evolution chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionStage {
    /// Species id
    pub id: u32,
    /// Species name
    pub name: String,
    /// Distance from the root (root is 0)
    pub depth: usize,
    /// Species this one evolves from
    pub parent_id: Option<u32>,
    /// Conditions on the edge from the parent
    pub conditions: Vec<EvolutionDetail>,
}

impl EvolutionChain {
    /// Flatten the tree depth-first, children in source order.
    ///
    /// # Errors
    /// Returns `CatalogError::MalformedUrl` if a species URL lacks an id.
    pub fn stages(&self) -> CatalogResult<Vec<EvolutionStage>> {
        let mut stages = Vec::new();
        flatten_into(&self.chain, 0, None, &mut stages)?;

        // Postcondition
        assert!(!stages.is_empty(), "a chain always has a root");
        Ok(stages)
    }

    /// Whether `species_id` appears anywhere in the chain.
    #[must_use]
    pub fn contains(&self, species_id: u32) -> bool {
        fn walk(link: &ChainLink, species_id: u32) -> bool {
            link.species.id().ok() == Some(species_id)
                || link.evolves_to.iter().any(|child| walk(child, species_id))
        }
        walk(&self.chain, species_id)
    }
}

fn flatten_into(
    link: &ChainLink,
    depth: usize,
    parent_id: Option<u32>,
    stages: &mut Vec<EvolutionStage>,
) -> CatalogResult<()> {
    let id = link.species.id()?;
    stages.push(EvolutionStage {
        id,
        name: link.species.name.clone(),
        depth,
        parent_id,
        conditions: link.evolution_details.clone(),
    });
    for child in &link.evolves_to {
        flatten_into(child, depth + 1, Some(id), stages)?;
    }
    Ok(())
}

// =============================================================================
// Derived
// =============================================================================

/// Everything the detail view shows for one Pokémon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokemonFullData {
    /// Detail record
    pub detail: PokemonDetail,
    /// Species record
    pub species: PokemonSpecies,
    /// Evolution chain containing the species
    pub evolution_chain: EvolutionChain,
}

impl From<&PokemonDetail> for PokemonListItem {
    fn from(detail: &PokemonDetail) -> Self {
        Self {
            id: detail.id,
            name: detail.name.clone(),
        }
    }
}
