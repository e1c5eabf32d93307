pub mod config;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::ecs::resources::{EventLog, FactionManager, SettlementRegistry};
use crate::model::{Tier, WorldGraph};
use crate::territory::{NameGenerator, TerritoryContext, TerritoryEngine};

pub use config::WorldGenConfig;

/// Settlements, territory state and the founding chronicle of a fresh world.
#[derive(Debug, Clone)]
pub struct GeneratedWorld {
    pub registry: SettlementRegistry,
    pub territory: TerritoryEngine,
    pub log: EventLog,
}

/// Populate a world graph with settlements and hand them out to factions.
///
/// Capitals first, then cities (each assigned or discarded on the spot), one
/// local-dominance pass, villages, and finally duplicate-capital repair.
pub fn generate_world(
    config: &WorldGenConfig,
    mut territory: TerritoryEngine,
    factions: &FactionManager,
    graph: &dyn WorldGraph,
    names: &mut dyn NameGenerator,
) -> GeneratedWorld {
    let mut registry = SettlementRegistry::new();
    let mut log = EventLog::new();
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut ctx = TerritoryContext {
        registry: &mut registry,
        factions,
        graph,
        names,
        log: &mut log,
        rng: &mut rng,
        tick: 0,
    };

    territory.spawn_capitals(&mut ctx);
    place_cities(config, &mut territory, &mut ctx);
    territory.enforce_local_dominance(&mut ctx);
    territory.spawn_villages(&mut ctx, config.villages_per_settlement);
    territory.fix_duplicate_capitals(&mut ctx);

    tracing::info!(
        settlements = registry.len(),
        capitals = registry.all_of_tier(Tier::Capital).count(),
        villages = registry.all_of_tier(Tier::Village).count(),
        seed = config.seed,
        "world generated"
    );
    GeneratedWorld {
        registry,
        territory,
        log,
    }
}

fn place_cities(
    config: &WorldGenConfig,
    territory: &mut TerritoryEngine,
    ctx: &mut TerritoryContext,
) {
    let mut kept = 0;
    for _ in 0..config.settlement_count {
        let Some(node) = ctx.random_open_node() else {
            break;
        };
        let tier = if ctx.rng.random::<f64>() < config.large_city_chance {
            Tier::LargeCity
        } else {
            Tier::SmallCity
        };
        let id = ctx.registry.add(String::new(), node, tier, None);
        if territory.assign_faction(ctx, id).is_some() {
            kept += 1;
        }
    }
    tracing::debug!(placed = config.settlement_count, kept, "cities placed");
}
