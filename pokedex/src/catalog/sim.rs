//! `SimCatalogProvider` - Deterministic Catalog for Testing
//!
//! `TigerStyle`: Simulation-first. Same seed, same catalog.
//!
//! Every response is synthesized as a JSON value and then decoded through
//! the same schemas the HTTP provider uses, so injected schema faults
//! surface exactly like a malformed server body would.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::types::{
    EvolutionChain, ListPage, ListResponse, PokemonDetail, PokemonListItem, PokemonSpecies,
};
use super::url::{artwork_url, resource_url, sprite_url};
use super::{decode_value, CatalogError, CatalogProvider, CatalogResult};
use crate::catalog::display::display_name;
use crate::constants::{
    CATALOG_API_BASE_URL_DEFAULT, CATALOG_FULL_INDEX_COUNT_MAX, CATALOG_SPRITES_BASE_URL_DEFAULT,
    DST_CATALOG_SPECIES_COUNT,
};
use crate::dst::{DeterministicRng, FaultInjector, FaultType};

// =============================================================================
// Fixture Data
// =============================================================================

const KANTO_NAMES: [&str; DST_CATALOG_SPECIES_COUNT as usize] = [
    "bulbasaur", "ivysaur", "venusaur", "charmander", "charmeleon", "charizard", "squirtle",
    "wartortle", "blastoise", "caterpie", "metapod", "butterfree", "weedle", "kakuna", "beedrill",
    "pidgey", "pidgeotto", "pidgeot", "rattata", "raticate", "spearow", "fearow", "ekans", "arbok",
    "pikachu", "raichu", "sandshrew", "sandslash", "nidoran-f", "nidorina", "nidoqueen",
    "nidoran-m", "nidorino", "nidoking", "clefairy", "clefable", "vulpix", "ninetales",
    "jigglypuff", "wigglytuff", "zubat", "golbat", "oddish", "gloom", "vileplume", "paras",
    "parasect", "venonat", "venomoth", "diglett", "dugtrio", "meowth", "persian", "psyduck",
    "golduck", "mankey", "primeape", "growlithe", "arcanine", "poliwag", "poliwhirl", "poliwrath",
    "abra", "kadabra", "alakazam", "machop", "machoke", "machamp", "bellsprout", "weepinbell",
    "victreebel", "tentacool", "tentacruel", "geodude", "graveler", "golem", "ponyta", "rapidash",
    "slowpoke", "slowbro", "magnemite", "magneton", "farfetchd", "doduo", "dodrio", "seel",
    "dewgong", "grimer", "muk", "shellder", "cloyster", "gastly", "haunter", "gengar", "onix",
    "drowzee", "hypno", "krabby", "kingler", "voltorb", "electrode", "exeggcute", "exeggutor",
    "cubone", "marowak", "hitmonlee", "hitmonchan", "lickitung", "koffing", "weezing", "rhyhorn",
    "rhydon", "chansey", "tangela", "kangaskhan", "horsea", "seadra", "goldeen", "seaking",
    "staryu", "starmie", "mr-mime", "scyther", "jynx", "electabuzz", "magmar", "pinsir", "tauros",
    "magikarp", "gyarados", "lapras", "ditto", "eevee", "vaporeon", "jolteon", "flareon",
    "porygon", "omanyte", "omastar", "kabuto", "kabutops", "aerodactyl", "snorlax", "articuno",
    "zapdos", "moltres", "dratini", "dragonair", "dragonite", "mewtwo", "mew",
];

const TYPE_NAMES: [&str; 15] = [
    "normal", "fire", "water", "electric", "grass", "ice", "fighting", "poison", "ground",
    "flying", "psychic", "bug", "rock", "ghost", "dragon",
];

const STAT_NAMES: [&str; 6] = [
    "hp",
    "attack",
    "defense",
    "special-attack",
    "special-defense",
    "speed",
];

const ABILITY_NAMES: [&str; 8] = [
    "overgrow",
    "blaze",
    "torrent",
    "static",
    "keen-eye",
    "run-away",
    "shed-skin",
    "swift-swim",
];

/// Chains for species outside the known families get this id offset.
const SINGLE_CHAIN_ID_OFFSET: u32 = 10_000;

/// Seed stride so neighbouring ids draw unrelated streams.
const ENTRY_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Level(u32),
    Item(&'static str),
}

/// A species inside a family; the root has no `from`.
#[derive(Debug, Clone, Copy)]
struct Member {
    species_id: u32,
    from: Option<(u32, Trigger)>,
}

#[derive(Debug)]
struct Family {
    chain_id: u32,
    members: &'static [Member],
}

const fn root(species_id: u32) -> Member {
    Member {
        species_id,
        from: None,
    }
}

const fn evolves(species_id: u32, parent: u32, trigger: Trigger) -> Member {
    Member {
        species_id,
        from: Some((parent, trigger)),
    }
}

static FAMILIES: [Family; 5] = [
    Family {
        chain_id: 1,
        members: &[
            root(1),
            evolves(2, 1, Trigger::Level(16)),
            evolves(3, 2, Trigger::Level(32)),
        ],
    },
    Family {
        chain_id: 2,
        members: &[
            root(4),
            evolves(5, 4, Trigger::Level(16)),
            evolves(6, 5, Trigger::Level(36)),
        ],
    },
    Family {
        chain_id: 3,
        members: &[
            root(7),
            evolves(8, 7, Trigger::Level(16)),
            evolves(9, 8, Trigger::Level(36)),
        ],
    },
    Family {
        chain_id: 10,
        members: &[root(25), evolves(26, 25, Trigger::Item("thunder-stone"))],
    },
    Family {
        chain_id: 67,
        members: &[
            root(133),
            evolves(134, 133, Trigger::Item("water-stone")),
            evolves(135, 133, Trigger::Item("thunder-stone")),
            evolves(136, 133, Trigger::Item("fire-stone")),
        ],
    },
];

// =============================================================================
// Request Accounting
// =============================================================================

/// Requests served per endpoint, including failed ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestStats {
    /// Page requests
    pub list: u64,
    /// Full name index requests
    pub all_names: u64,
    /// Detail requests (by id or name)
    pub detail: u64,
    /// Species requests
    pub species: u64,
    /// Evolution chain requests
    pub evolution: u64,
}

#[derive(Debug, Default)]
struct RequestCounters {
    list: AtomicU64,
    all_names: AtomicU64,
    detail: AtomicU64,
    species: AtomicU64,
    evolution: AtomicU64,
}

impl RequestCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> RequestStats {
        RequestStats {
            list: self.list.load(Ordering::Relaxed),
            all_names: self.all_names.load(Ordering::Relaxed),
            detail: self.detail.load(Ordering::Relaxed),
            species: self.species.load(Ordering::Relaxed),
            evolution: self.evolution.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// SimCatalogProvider
// =============================================================================

/// Simulated catalog serving the first 151 species.
///
/// `TigerStyle`:
/// - Entry data derived from `(seed, id)` only
/// - Fault injection via a shared `FaultInjector`
/// - Clones share request counters
///
/// # Example
///
/// ```rust
/// use pokedex::catalog::{CatalogProvider, SimCatalogProvider};
///
/// # #[tokio::main]
/// # async fn main() {
/// let catalog = SimCatalogProvider::with_seed(42);
/// let page = catalog.fetch_list(0, 3).await.unwrap();
/// assert_eq!(page.items[0].name, "bulbasaur");
/// assert!(page.has_more);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SimCatalogProvider {
    api_base: String,
    sprites_base: String,
    entries: Arc<BTreeMap<u32, String>>,
    seed: u64,
    fault_injector: Arc<FaultInjector>,
    requests: Arc<RequestCounters>,
}

impl SimCatalogProvider {
    /// Create the full 151-species catalog with no faults.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_faults(seed, Arc::new(FaultInjector::new(DeterministicRng::new(seed))))
    }

    /// Create the full catalog sharing a fault injector with a `Simulation`.
    #[must_use]
    pub fn with_faults(seed: u64, fault_injector: Arc<FaultInjector>) -> Self {
        let entries = (1_u32..)
            .zip(KANTO_NAMES)
            .map(|(id, name)| (id, name.to_string()))
            .collect();
        Self::from_entries(seed, entries, fault_injector)
    }

    /// Create a catalog holding exactly `entries`.
    ///
    /// # Panics
    /// Panics if an id is zero, repeated, or a name is empty.
    #[must_use]
    pub fn with_entries(seed: u64, entries: &[(u32, &str)]) -> Self {
        let mut map = BTreeMap::new();
        for (id, name) in entries {
            // Preconditions
            assert!(*id > 0, "catalog ids start at 1");
            assert!(!name.is_empty(), "name must not be empty");
            let previous = map.insert(*id, (*name).to_string());
            assert!(previous.is_none(), "duplicate catalog id {id}");
        }
        Self::from_entries(
            seed,
            map,
            Arc::new(FaultInjector::new(DeterministicRng::new(seed))),
        )
    }

    fn from_entries(
        seed: u64,
        entries: BTreeMap<u32, String>,
        fault_injector: Arc<FaultInjector>,
    ) -> Self {
        Self {
            api_base: CATALOG_API_BASE_URL_DEFAULT.to_string(),
            sprites_base: CATALOG_SPRITES_BASE_URL_DEFAULT.to_string(),
            entries: Arc::new(entries),
            seed,
            fault_injector,
            requests: Arc::new(RequestCounters::default()),
        }
    }

    /// Number of entries served.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Requests served so far.
    #[must_use]
    pub fn requests(&self) -> RequestStats {
        self.requests.snapshot()
    }

    // =========================================================================
    // Response plumbing
    // =========================================================================

    /// Consult the injector, then decode `body` (`None` means 404).
    ///
    /// Yields once first, like a network round trip would.
    async fn respond<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        strip_key: &str,
        body: Option<Value>,
    ) -> CatalogResult<T> {
        tokio::task::yield_now().await;

        let fault = self
            .fault_injector
            .should_inject_matching(operation, |f| !f.is_storage());

        if let Some(fault_type) = fault {
            if fault_type != FaultType::ApiSchemaMismatch {
                return Err(fault_error(operation, url, fault_type));
            }
        }

        let mut value = body.ok_or_else(|| CatalogError::http(url, 404))?;
        if fault == Some(FaultType::ApiSchemaMismatch) {
            if let Value::Object(map) = &mut value {
                map.remove(strip_key);
            }
        }
        decode_value(url, value)
    }

    fn entry_rng(&self, id: u32) -> DeterministicRng {
        DeterministicRng::new(self.seed ^ u64::from(id).wrapping_mul(ENTRY_SEED_STRIDE))
    }

    fn named(&self, kind: &str, id: u32, name: &str) -> Value {
        json!({ "name": name, "url": resource_url(&self.api_base, kind, id) })
    }

    // =========================================================================
    // Synthesis
    // =========================================================================

    fn list_body(&self, offset: u32, limit: u32) -> Value {
        let count = self.entries.len() as u32;
        let results: Vec<Value> = self
            .entries
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|(id, name)| self.named("pokemon", *id, name))
            .collect();

        let page_url = |o: u32| format!("{}/pokemon?offset={o}&limit={limit}", self.api_base);
        let next = (offset.saturating_add(limit) < count).then(|| page_url(offset + limit));
        let previous = (offset > 0).then(|| page_url(offset.saturating_sub(limit)));

        json!({ "count": count, "next": next, "previous": previous, "results": results })
    }

    fn detail_body(&self, id: u32) -> Option<Value> {
        let name = self.entries.get(&id)?;
        let mut rng = self.entry_rng(id);

        let primary = TYPE_NAMES[rng.next_usize(0, TYPE_NAMES.len() - 1)];
        let mut types = vec![json!({ "slot": 1, "type": self.named("type", 1, primary) })];
        if rng.next_bool(0.5) {
            let secondary = TYPE_NAMES[rng.next_usize(0, TYPE_NAMES.len() - 1)];
            if secondary != primary {
                types.push(json!({ "slot": 2, "type": self.named("type", 2, secondary) }));
            }
        }

        let stats: Vec<Value> = (1_u32..)
            .zip(STAT_NAMES)
            .map(|(stat_id, stat)| {
                json!({
                    "base_stat": rng.next_u32(10, 160),
                    "effort": rng.next_u32(0, 3),
                    "stat": self.named("stat", stat_id, stat),
                })
            })
            .collect();

        let visible = ABILITY_NAMES[rng.next_usize(0, ABILITY_NAMES.len() - 1)];
        let hidden = ABILITY_NAMES[rng.next_usize(0, ABILITY_NAMES.len() - 1)];
        let abilities = json!([
            { "ability": self.named("ability", 1, visible), "is_hidden": false, "slot": 1 },
            { "ability": self.named("ability", 2, hidden), "is_hidden": true, "slot": 3 },
        ]);

        let base_experience = (!rng.next_bool(0.05)).then(|| rng.next_u32(36, 306));

        Some(json!({
            "id": id,
            "name": name,
            "height": rng.next_u32(2, 40),
            "weight": rng.next_u32(10, 2000),
            "base_experience": base_experience,
            "types": types,
            "stats": stats,
            "abilities": abilities,
            "sprites": {
                "front_default": sprite_url(&self.sprites_base, id),
                "front_shiny": null,
                "back_default": null,
                "back_shiny": null,
                "other": {
                    "official-artwork": {
                        "front_default": artwork_url(&self.sprites_base, id),
                        "front_shiny": null,
                    }
                }
            },
            "species": self.named("pokemon-species", id, name),
        }))
    }

    fn species_body(&self, id: u32) -> Option<Value> {
        let name = self.entries.get(&id)?;
        let display = display_name(name);
        let chain_id = self.chain_id_for(id);

        Some(json!({
            "id": id,
            "name": name,
            "evolution_chain": { "url": resource_url(&self.api_base, "evolution-chain", chain_id) },
            "flavor_text_entries": [
                {
                    "flavor_text": format!("{display} lives in\nsimulated grass.\u{c}It was seen {} times.", id * 3),
                    "language": self.named("language", 9, "en"),
                    "version": self.named("version", 1, "red"),
                },
            ],
            "genera": [
                { "genus": format!("{display} Pokémon"), "language": self.named("language", 9, "en") },
            ],
        }))
    }

    /// Family containing `species_id`, if its root is in this catalog.
    fn family_of(&self, species_id: u32) -> Option<&'static Family> {
        FAMILIES.iter().find(|family| {
            family.members.iter().any(|m| m.species_id == species_id)
                && family
                    .members
                    .first()
                    .is_some_and(|root| self.entries.contains_key(&root.species_id))
        })
    }

    fn chain_id_for(&self, species_id: u32) -> u32 {
        self.family_of(species_id)
            .map_or(species_id + SINGLE_CHAIN_ID_OFFSET, |family| family.chain_id)
    }

    fn chain_body(&self, chain_id: u32) -> Option<Value> {
        if chain_id > SINGLE_CHAIN_ID_OFFSET {
            let species_id = chain_id - SINGLE_CHAIN_ID_OFFSET;
            if !self.entries.contains_key(&species_id) || self.chain_id_for(species_id) != chain_id {
                return None;
            }
            let link = self.chain_link(species_id, None, &[]);
            return Some(json!({ "id": chain_id, "chain": link }));
        }

        let family = FAMILIES.iter().find(|f| f.chain_id == chain_id)?;
        let root = family.members.first()?;
        if !self.entries.contains_key(&root.species_id) {
            return None;
        }
        let link = self.chain_link(root.species_id, None, family.members);
        Some(json!({ "id": chain_id, "chain": link }))
    }

    fn chain_link(&self, species_id: u32, trigger: Option<Trigger>, members: &[Member]) -> Value {
        let name = self
            .entries
            .get(&species_id)
            .map_or("unknown", String::as_str);

        let children: Vec<Value> = members
            .iter()
            .filter_map(|m| match m.from {
                Some((parent, t)) if parent == species_id && self.entries.contains_key(&m.species_id) => {
                    Some(self.chain_link(m.species_id, Some(t), members))
                }
                _ => None,
            })
            .collect();

        let details: Vec<Value> = trigger
            .map(|t| match t {
                Trigger::Level(level) => json!({
                    "min_level": level,
                    "trigger": self.named("evolution-trigger", 1, "level-up"),
                    "item": null,
                }),
                Trigger::Item(item) => json!({
                    "min_level": null,
                    "trigger": self.named("evolution-trigger", 3, "use-item"),
                    "item": self.named("item", 80, item),
                }),
            })
            .into_iter()
            .collect();

        json!({
            "species": self.named("pokemon-species", species_id, name),
            "evolution_details": details,
            "evolves_to": children,
        })
    }
}

fn fault_error(operation: &str, url: &str, fault_type: FaultType) -> CatalogError {
    match fault_type {
        FaultType::NetworkTimeout => CatalogError::transport(url, "timed out"),
        FaultType::NetworkConnectionRefused => CatalogError::transport(url, "connection refused"),
        FaultType::NetworkReset => CatalogError::transport(url, "connection reset"),
        FaultType::ApiNotFound => CatalogError::http(url, 404),
        FaultType::ApiRateLimit => CatalogError::http(url, 429),
        FaultType::ApiServerError => CatalogError::http(url, 503),
        other => CatalogError::simulated_fault(operation, other.as_str()),
    }
}

#[async_trait]
impl CatalogProvider for SimCatalogProvider {
    #[tracing::instrument(skip(self))]
    async fn fetch_list(&self, offset: u32, limit: u32) -> CatalogResult<ListPage> {
        if limit == 0 {
            return Err(CatalogError::invalid_request("limit must be positive"));
        }

        RequestCounters::bump(&self.requests.list);
        let operation = format!("catalog.list[{offset}]");
        let url = format!("{}/pokemon?offset={offset}&limit={limit}", self.api_base);
        let body = self.list_body(offset, limit);

        let response: ListResponse = self.respond(&operation, &url, "results", Some(body)).await?;
        ListPage::from_response(response)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_detail(&self, id: u32) -> CatalogResult<PokemonDetail> {
        RequestCounters::bump(&self.requests.detail);
        let operation = format!("catalog.detail[{id}]");
        let url = resource_url(&self.api_base, "pokemon", id);

        self.respond(&operation, &url, "name", self.detail_body(id)).await
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_detail_by_name(&self, name: &str) -> CatalogResult<PokemonDetail> {
        RequestCounters::bump(&self.requests.detail);
        let operation = format!("catalog.detail[{name}]");
        let url = format!("{}/pokemon/{name}", self.api_base);
        let body = self
            .entries
            .iter()
            .find(|(_, entry)| entry.as_str() == name)
            .and_then(|(id, _)| self.detail_body(*id));

        self.respond(&operation, &url, "name", body).await
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_all_names(&self) -> CatalogResult<Vec<PokemonListItem>> {
        RequestCounters::bump(&self.requests.all_names);
        let url = format!("{}/pokemon?limit={CATALOG_FULL_INDEX_COUNT_MAX}", self.api_base);
        let body = self.list_body(0, CATALOG_FULL_INDEX_COUNT_MAX);

        let response: ListResponse = self
            .respond("catalog.all_names", &url, "results", Some(body))
            .await?;
        Ok(ListPage::from_response(response)?.items)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_species(&self, id: u32) -> CatalogResult<PokemonSpecies> {
        RequestCounters::bump(&self.requests.species);
        let operation = format!("catalog.species[{id}]");
        let url = resource_url(&self.api_base, "pokemon-species", id);

        self.respond(&operation, &url, "evolution_chain", self.species_body(id))
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_evolution_chain(&self, chain_id: u32) -> CatalogResult<EvolutionChain> {
        RequestCounters::bump(&self.requests.evolution);
        let operation = format!("catalog.evolution[{chain_id}]");
        let url = resource_url(&self.api_base, "evolution-chain", chain_id);

        self.respond(&operation, &url, "chain", self.chain_body(chain_id))
            .await
    }

    fn name(&self) -> &'static str {
        "sim"
    }

    fn is_simulation(&self) -> bool {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
