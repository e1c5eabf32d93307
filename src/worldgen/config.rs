/// Configuration for world generation.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldGenConfig {
    /// RNG seed for deterministic generation.
    pub seed: u64,
    /// Cities placed after the capitals, before faction assignment prunes them.
    pub settlement_count: usize,
    /// Chance (0.0–1.0) that a placed city is a large one.
    pub large_city_chance: f64,
    /// Villages aimed for per settlement standing once cities are placed.
    pub villages_per_settlement: usize,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            settlement_count: 40,
            large_city_chance: 0.3,
            villages_per_settlement: 2,
        }
    }
}
