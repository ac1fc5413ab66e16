use serde::Deserialize;

use crate::state::creature::{BaseStats, Creature, display_name};

use super::error::CatalogError;

/// Height and weight arrive as decimetres and hectograms.
const SUBUNIT_DIVISOR: f64 = 10.0;

/// Raw creature record as served by the remote catalog.
#[derive(Debug, Deserialize)]
pub struct RawCreature {
    pub id: u32,
    pub name: String,
    pub sprites: RawSprites,
    #[serde(default)]
    pub types: Vec<RawTypeSlot>,
    pub height: u32,
    pub weight: u32,
    #[serde(default)]
    pub abilities: Vec<RawAbilitySlot>,
    #[serde(default)]
    pub stats: Vec<RawStat>,
    pub species: NamedResource,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSprites {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<RawOtherSprites>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawOtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<RawArtwork>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawArtwork {
    #[serde(default)]
    pub front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawTypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct RawAbilitySlot {
    pub ability: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct RawStat {
    pub base_stat: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl RawSprites {
    /// Prefer the high resolution artwork, then the default sprite.
    fn preferred(self) -> Option<String> {
        self.other
            .and_then(|other| other.official_artwork)
            .and_then(|artwork| artwork.front_default)
            .filter(|url| !url.is_empty())
            .or(self.front_default.filter(|url| !url.is_empty()))
    }
}

fn base_stat(stats: &[RawStat], key: &str) -> u32 {
    stats
        .iter()
        .find(|entry| entry.stat.name == key)
        .map(|entry| entry.base_stat)
        .unwrap_or(0)
}

impl TryFrom<RawCreature> for Creature {
    type Error = CatalogError;

    fn try_from(raw: RawCreature) -> Result<Self, Self::Error> {
        let id = raw.id;
        if raw.name.is_empty() {
            return Err(CatalogError::MissingField { id, field: "name" });
        }
        if raw.types.is_empty() {
            return Err(CatalogError::MissingField { id, field: "types" });
        }
        let image_url = raw
            .sprites
            .preferred()
            .ok_or(CatalogError::MissingField { id, field: "sprites" })?;

        let stats = BaseStats {
            hp: base_stat(&raw.stats, "hp"),
            attack: base_stat(&raw.stats, "attack"),
            defense: base_stat(&raw.stats, "defense"),
            speed: base_stat(&raw.stats, "speed"),
        };

        Ok(Creature {
            id,
            name: display_name(&raw.name),
            image_url,
            types: raw.types.into_iter().map(|slot| slot.kind.name).collect(),
            height: f64::from(raw.height) / SUBUNIT_DIVISOR,
            weight: f64::from(raw.weight) / SUBUNIT_DIVISOR,
            abilities: raw
                .abilities
                .iter()
                .map(|slot| display_name(&slot.ability.name))
                .collect(),
            stats,
            species_url: raw.species.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawCreature {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> serde_json::Value {
        json!({
            "id": 122,
            "name": "mr-mime",
            "sprites": {
                "front_default": "https://img.test/sprite/122.png",
                "other": {
                    "official-artwork": { "front_default": "https://img.test/art/122.png" }
                }
            },
            "types": [
                { "slot": 1, "type": { "name": "psychic", "url": "https://t/14" } },
                { "slot": 2, "type": { "name": "fairy", "url": "https://t/18" } }
            ],
            "height": 13,
            "weight": 545,
            "abilities": [
                { "ability": { "name": "soundproof", "url": "" }, "is_hidden": false },
                { "ability": { "name": "filter", "url": "" }, "is_hidden": false },
                { "ability": { "name": "technician", "url": "" }, "is_hidden": true }
            ],
            "stats": [
                { "base_stat": 40, "effort": 0, "stat": { "name": "hp" } },
                { "base_stat": 90, "effort": 0, "stat": { "name": "speed" } },
                { "base_stat": 100, "effort": 2, "stat": { "name": "special-attack" } },
                { "base_stat": 45, "effort": 0, "stat": { "name": "attack" } }
            ],
            "species": { "name": "mr-mime", "url": "https://catalog.test/species/122/" }
        })
    }

    #[test]
    fn normalises_full_payload() {
        let creature = Creature::try_from(raw(sample())).unwrap();

        assert_eq!(creature.id, 122);
        assert_eq!(creature.name, "Mr mime");
        assert_eq!(creature.image_url, "https://img.test/art/122.png");
        assert_eq!(creature.types, vec!["psychic", "fairy"]);
        assert!((creature.height - 1.3).abs() < f64::EPSILON);
        assert!((creature.weight - 54.5).abs() < f64::EPSILON);
        assert_eq!(creature.abilities, vec!["Soundproof", "Filter", "Technician"]);
        assert_eq!(
            creature.stats,
            BaseStats {
                hp: 40,
                attack: 45,
                defense: 0,
                speed: 90,
            }
        );
        assert_eq!(creature.species_url, "https://catalog.test/species/122/");
    }

    #[test]
    fn falls_back_to_default_sprite() {
        let mut value = sample();
        value["sprites"]["other"]["official-artwork"]["front_default"] = json!(null);
        let creature = Creature::try_from(raw(value)).unwrap();
        assert_eq!(creature.image_url, "https://img.test/sprite/122.png");
    }

    #[test]
    fn missing_images_is_malformed() {
        let mut value = sample();
        value["sprites"] = json!({ "front_default": null });
        let err = Creature::try_from(raw(value)).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingField {
                id: 122,
                field: "sprites"
            }
        ));
    }

    #[test]
    fn empty_types_is_malformed() {
        let mut value = sample();
        value["types"] = json!([]);
        let err = Creature::try_from(raw(value)).unwrap_err();
        assert!(matches!(err, CatalogError::MissingField { field: "types", .. }));
    }
}
