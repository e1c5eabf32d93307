use std::hash::{DefaultHasher, Hash, Hasher};
use std::io;

use bevy_ecs::resource::Resource;
use bevy_ecs::world::World;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Deserialize;

use crate::ecs::time::TICKS_PER_DAY;

/// Simulation tunables.
///
/// Missing fields in a JSON config fall back to the defaults.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    /// Short-circuits the long waits: near-zero war interval, no travel phase,
    /// instant siege resolution and a short drift interval.
    pub debug_mode: bool,
    /// Ticks between settlement strength growth passes.
    pub strength_growth_interval: u64,
    /// Settlements this close to a defender may be picked as its attacker.
    pub war_proximity_radius: f64,
    pub capital_radius_min: u32,
    pub capital_radius_max: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            debug_mode: false,
            strength_growth_interval: TICKS_PER_DAY,
            war_proximity_radius: 10.0,
            capital_radius_min: 20,
            capital_radius_max: 40,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> io::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Deterministic RNG for the simulation.
#[derive(Resource)]
pub struct SimRng {
    pub rng: SmallRng,
    pub seed: u64,
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            seed,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-domain RNG resources
// ---------------------------------------------------------------------------

macro_rules! domain_rng {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Resource)]
        pub struct $name(pub SmallRng);

        impl Default for $name {
            fn default() -> Self {
                Self(SmallRng::seed_from_u64(0))
            }
        }
    };
}

domain_rng!(DiplomacyRng, "Per-domain RNG for the relationship simulator.");
domain_rng!(WarRng, "Per-domain RNG for the war state machine.");
domain_rng!(StrengthRng, "Per-domain RNG for the strength economy.");

/// Derive a deterministic per-domain seed from the global seed, domain name, and tick count.
fn derive_domain_seed(seed: u64, domain: &str, tick: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    domain.hash(&mut hasher);
    tick.hash(&mut hasher);
    hasher.finish()
}

/// Exclusive system that re-seeds all per-domain RNGs each tick.
/// Runs in `SimPhase::PreUpdate` before any domain systems.
pub fn distribute_rng(world: &mut World) {
    let seed = world.resource::<SimRng>().seed;
    let tick = world.resource::<crate::ecs::clock::SimClock>().tick_count;

    macro_rules! reseed {
        ($res:ty, $label:expr) => {
            world.resource_mut::<$res>().0 =
                SmallRng::seed_from_u64(derive_domain_seed(seed, $label, tick));
        };
    }

    reseed!(DiplomacyRng, "diplomacy");
    reseed!(WarRng, "war");
    reseed!(StrengthRng, "strength");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_seeds_differ_by_domain_and_tick() {
        let a = derive_domain_seed(1, "war", 10);
        assert_eq!(a, derive_domain_seed(1, "war", 10));
        assert_ne!(a, derive_domain_seed(1, "diplomacy", 10));
        assert_ne!(a, derive_domain_seed(1, "war", 11));
    }

    #[test]
    fn config_json_fills_defaults() {
        let config = SimConfig::from_json_str(r#"{ "seed": 7, "debug_mode": true }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert!(config.debug_mode);
        assert_eq!(config.capital_radius_min, 20);
        assert_eq!(config.strength_growth_interval, TICKS_PER_DAY);
    }

    #[test]
    fn config_json_rejects_garbage() {
        assert!(SimConfig::from_json_str("{ not json").is_err());
    }
}
