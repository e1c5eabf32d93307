use rand::{Rng, RngCore};

use crate::model::{Biome, Settlement, tidy_settlement_name};

/// Name-generation collaborator. Produces a raw name; tier conventions are
/// applied afterwards by [`tidy_settlement_name`].
pub trait NameGenerator {
    fn generate_name(&mut self, settlement: &Settlement, biome: Biome, rng: &mut dyn RngCore)
    -> String;
}

/// Default generator: biome-flavoured prefix plus a place suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiomeNames;

const SUFFIXES: &[&str] = &[
    "hold", "haven", "ford", "stead", "gate", "bury", "well", "ton", "march", "dale",
];

fn prefixes(biome: Biome) -> &'static [&'static str] {
    match biome {
        Biome::Grassland => &["Wheat", "Gold", "Green", "Wind", "Sun"],
        Biome::TemperateForest => &["Oak", "Elm", "Thorn", "Moss", "Pine"],
        Biome::BorealForest => &["Fir", "Spruce", "Wolf", "Frost", "Lynx"],
        Biome::AridShrubland => &["Sage", "Amber", "Dry", "Copper", "Ridge"],
        Biome::Desert => &["Sand", "Oasis", "Dust", "Mirage", "Sun"],
        Biome::Swamp => &["Bog", "Reed", "Fog", "Marsh", "Mud"],
        Biome::Tundra | Biome::IceSheet | Biome::SeaIce => &["Ice", "Snow", "White", "Pale", "Rime"],
        Biome::Ocean => &["Tide", "Shell", "Wave", "Pearl", "Reef"],
    }
}

impl NameGenerator for BiomeNames {
    fn generate_name(
        &mut self,
        _settlement: &Settlement,
        biome: Biome,
        rng: &mut dyn RngCore,
    ) -> String {
        let prefixes = prefixes(biome);
        let prefix = prefixes[rng.random_range(0..prefixes.len())];
        let suffix = SUFFIXES[rng.random_range(0..SUFFIXES.len())];
        format!("{prefix}{suffix}")
    }
}

/// Generate a fresh name for `settlement` and apply its tier convention.
pub fn name_for(
    names: &mut dyn NameGenerator,
    settlement: &Settlement,
    biome: Biome,
    rng: &mut dyn RngCore,
) -> String {
    let raw = names.generate_name(settlement, biome, rng);
    tidy_settlement_name(settlement.tier, &raw)
}
