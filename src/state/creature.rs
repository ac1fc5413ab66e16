use serde::Serialize;
use utoipa::ToSchema;

/// Separator used by the catalog inside slug-like names (`mr-mime`).
const NAME_SEPARATOR: char = '-';

/// Normalised, display-ready record for a single creature.
///
/// Values are never mutated after construction; every slot owns its own clone.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Creature {
    /// Catalog identifier in `[1, N]`.
    pub id: u32,
    /// Human readable name (see [`display_name`]).
    pub name: String,
    /// Artwork URI, falling back to the default sprite.
    pub image_url: String,
    /// Category tags in catalog order, never empty.
    pub types: Vec<String>,
    /// Height in metres.
    pub height: f64,
    /// Weight in kilograms.
    pub weight: f64,
    /// Ability names, normalised like [`Creature::name`].
    pub abilities: Vec<String>,
    /// Base stats, missing keys default to 0.
    pub stats: BaseStats,
    /// Extended species record, passed through untouched.
    pub species_url: String,
}

/// Fixed set of base stats surfaced on a card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BaseStats {
    /// Hit points.
    pub hp: u32,
    /// Physical attack.
    pub attack: u32,
    /// Physical defense.
    pub defense: u32,
    /// Speed.
    pub speed: u32,
}

/// Normalise a catalog slug for display.
///
/// Only the first character is uppercased and only the first separator is replaced,
/// so `"tapu-koko-x"` becomes `"Tapu koko-x"`.
pub fn display_name(raw: &str) -> String {
    let replaced = raw.replacen(NAME_SEPARATOR, " ", 1);
    let mut chars = replaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
