//! Display helpers.
//!
//! Presentation-free formatting shared by every screen: numbers, names,
//! units, stat bars and the share text.

use super::types::{PokemonDetail, PokemonSpecies, StatEntry};
use crate::constants::{DISPLAY_ID_DIGITS_COUNT, STAT_BASE_VALUE_MAX};

/// Zero-padded catalog number (`25` → `"025"`).
#[must_use]
pub fn display_id(id: u32) -> String {
    format!("{id:0width$}", width = DISPLAY_ID_DIGITS_COUNT)
}

/// Name with its first letter upper-cased (`"mr-mime"` → `"Mr-mime"`).
#[must_use]
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Human label for a stat name; unknown stats keep their raw name.
#[must_use]
pub fn stat_label(stat_name: &str) -> &str {
    match stat_name {
        "hp" => "HP",
        "attack" => "Attack",
        "defense" => "Defense",
        "special-attack" => "Sp. Attack",
        "special-defense" => "Sp. Defense",
        "speed" => "Speed",
        other => other,
    }
}

/// Fill of a stat bar in percent, capped at 100.
#[must_use]
pub fn stat_percentage(value: u32) -> f64 {
    (f64::from(value) / f64::from(STAT_BASE_VALUE_MAX) * 100.0).min(100.0)
}

/// Text shared from the detail screen.
#[must_use]
pub fn share_message(detail: &PokemonDetail) -> String {
    format!(
        "Check out {} (#{}) in the Pokédex!",
        display_name(&detail.name),
        display_id(detail.id)
    )
}

/// Title shared alongside [`share_message`].
#[must_use]
pub fn share_title(detail: &PokemonDetail) -> String {
    format!("{} - Pokédex", display_name(&detail.name))
}

impl PokemonDetail {
    /// Weight in kilograms.
    #[must_use]
    pub fn weight_kg(&self) -> f64 {
        f64::from(self.weight) / 10.0
    }

    /// Height in metres.
    #[must_use]
    pub fn height_m(&self) -> f64 {
        f64::from(self.height) / 10.0
    }

    /// Weight as shown on the about tab (`"6.0 kg"`).
    #[must_use]
    pub fn formatted_weight(&self) -> String {
        format!("{:.1} kg", self.weight_kg())
    }

    /// Height as shown on the about tab (`"0.4 m"`).
    #[must_use]
    pub fn formatted_height(&self) -> String {
        format!("{:.1} m", self.height_m())
    }

    /// Base experience, or `"-"` when unknown.
    #[must_use]
    pub fn formatted_base_experience(&self) -> String {
        self.base_experience
            .map_or_else(|| "-".to_string(), |xp| xp.to_string())
    }

    /// Type names in slot order.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        let mut slots: Vec<_> = self.types.iter().collect();
        slots.sort_by_key(|t| t.slot);
        slots.into_iter().map(|t| t.kind.name.as_str()).collect()
    }

    /// Non-hidden ability names, first hyphen replaced by a space.
    #[must_use]
    pub fn visible_abilities(&self) -> Vec<String> {
        self.abilities
            .iter()
            .filter(|a| !a.is_hidden)
            .map(|a| a.ability.name.replacen('-', " ", 1))
            .collect()
    }

    /// Base stat by name.
    #[must_use]
    pub fn stat(&self, stat_name: &str) -> Option<&StatEntry> {
        self.stats.iter().find(|s| s.stat.name == stat_name)
    }

    /// Sum of all base stats.
    #[must_use]
    pub fn base_stat_total(&self) -> u32 {
        self.stats.iter().map(|s| s.base_stat).sum()
    }

    /// Best available large image: official artwork, else the front sprite.
    #[must_use]
    pub fn artwork_or_sprite(&self) -> Option<&str> {
        self.sprites
            .other
            .as_ref()
            .and_then(|other| other.official_artwork.as_ref())
            .and_then(|artwork| artwork.front_default.as_deref())
            .or(self.sprites.front_default.as_deref())
    }
}

impl PokemonSpecies {
    /// First flavor text in `language`, with line breaks flattened to spaces.
    #[must_use]
    pub fn flavor_text(&self, language: &str) -> Option<String> {
        self.flavor_text_entries
            .iter()
            .find(|entry| entry.language.name == language)
            .map(|entry| {
                entry
                    .flavor_text
                    .split(['\n', '\u{c}', '\r'])
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
    }

    /// Genus in `language` ("Mouse Pokémon").
    #[must_use]
    pub fn genus(&self, language: &str) -> Option<&str> {
        self.genera
            .iter()
            .find(|g| g.language.name == language)
            .map(|g| g.genus.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{
        AbilitySlot, ChainReference, FlavorTextEntry, Genus, NamedResource, Sprites, TypeSlot,
    };

    fn named(name: &str) -> NamedResource {
        NamedResource {
            name: name.to_string(),
            url: format!("https://pokeapi.co/api/v2/x/{}/", name.len()),
        }
    }

    fn bulbasaur() -> PokemonDetail {
        PokemonDetail {
            id: 1,
            name: "bulbasaur".into(),
            height: 7,
            weight: 69,
            base_experience: None,
            types: vec![
                TypeSlot { slot: 2, kind: named("poison") },
                TypeSlot { slot: 1, kind: named("grass") },
            ],
            stats: vec![
                StatEntry { base_stat: 45, effort: 0, stat: named("hp") },
                StatEntry { base_stat: 49, effort: 0, stat: named("attack") },
            ],
            abilities: vec![
                AbilitySlot { ability: named("over-grow-x"), is_hidden: false, slot: 1 },
                AbilitySlot { ability: named("chlorophyll"), is_hidden: true, slot: 3 },
            ],
            sprites: Sprites {
                front_default: Some("front.png".into()),
                front_shiny: None,
                back_default: None,
                back_shiny: None,
                other: None,
            },
            species: named("bulbasaur"),
        }
    }

    #[test]
    fn test_display_id_and_name() {
        assert_eq!(display_id(1), "001");
        assert_eq!(display_id(25), "025");
        assert_eq!(display_id(1025), "1025");
        assert_eq!(display_name("pikachu"), "Pikachu");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn test_units_and_fallbacks() {
        let detail = bulbasaur();
        assert_eq!(detail.formatted_weight(), "6.9 kg");
        assert_eq!(detail.formatted_height(), "0.7 m");
        assert_eq!(detail.formatted_base_experience(), "-");
        assert_eq!(detail.artwork_or_sprite(), Some("front.png"));
    }

    #[test]
    fn test_types_abilities_stats() {
        let detail = bulbasaur();
        assert_eq!(detail.type_names(), vec!["grass", "poison"]);
        assert_eq!(detail.visible_abilities(), vec!["over grow-x".to_string()]);
        assert_eq!(detail.stat("attack").map(|s| s.base_stat), Some(49));
        assert_eq!(detail.base_stat_total(), 94);
    }

    #[test]
    fn test_stat_percentage_capped() {
        assert!((stat_percentage(255) - 100.0).abs() < f64::EPSILON);
        assert!((stat_percentage(51) - 20.0).abs() < 1e-9);
        assert!((stat_percentage(300) - 100.0).abs() < f64::EPSILON);
        assert_eq!(stat_label("special-attack"), "Sp. Attack");
        assert_eq!(stat_label("accuracy"), "accuracy");
    }

    #[test]
    fn test_share_text() {
        let detail = bulbasaur();
        assert_eq!(share_message(&detail), "Check out Bulbasaur (#001) in the Pokédex!");
        assert_eq!(share_title(&detail), "Bulbasaur - Pokédex");
    }

    #[test]
    fn test_species_text() {
        let species = PokemonSpecies {
            id: 25,
            name: "pikachu".into(),
            evolution_chain: ChainReference { url: "https://pokeapi.co/api/v2/evolution-chain/10/".into() },
            flavor_text_entries: vec![
                FlavorTextEntry {
                    flavor_text: "ピカチュウ".into(),
                    language: named("ja"),
                    version: named("red"),
                },
                FlavorTextEntry {
                    flavor_text: "When several of\nthese POKéMON\u{c}gather".into(),
                    language: named("en"),
                    version: named("red"),
                },
            ],
            genera: vec![Genus { genus: "Mouse Pokémon".into(), language: named("en") }],
        };

        assert_eq!(
            species.flavor_text("en").as_deref(),
            Some("When several of these POKéMON gather")
        );
        assert_eq!(species.genus("en"), Some("Mouse Pokémon"));
        assert_eq!(species.genus("fr"), None);
    }
}
