#![allow(dead_code)]

use bevy_app::App;
use dominion_sim::ecs::resources::{FactionManager, SimConfig};
use dominion_sim::ecs::{SimTick, new_world_app};
use dominion_sim::model::{Biome, Faction, TileGraph};
use dominion_sim::territory::BiomeNames;
use dominion_sim::worldgen::config::WorldGenConfig;
use dominion_sim::{FactionId, NodeId};

pub const SIDE: u32 = 48;

/// Three contestants, one hidden faction and the player.
pub fn factions() -> FactionManager {
    let mut factions = FactionManager::new();
    factions.add(Faction::new(FactionId(1), "Ashen Crown"));
    factions.add(Faction::new(FactionId(2), "River Pact"));
    factions.add(Faction::new(FactionId(3), "Gilded Reach"));
    factions.add(Faction::new(FactionId(8), "Veiled Hand").hidden());
    factions.add(Faction::new(FactionId(9), "Colony").player());
    factions
}

/// Square island: ocean rim two tiles deep, an ice cap along the north
/// shore and mixed land inside.
pub fn island() -> TileGraph {
    let mut graph = TileGraph::grid(SIDE, SIDE, Biome::Grassland);
    for y in 0..SIDE {
        for x in 0..SIDE {
            let node = NodeId(y * SIDE + x);
            let edge = x.min(y).min(SIDE - 1 - x).min(SIDE - 1 - y);
            let biome = if edge < 2 {
                Biome::Ocean
            } else if y < 5 {
                Biome::IceSheet
            } else if x > 30 && y > 30 {
                Biome::Desert
            } else if x < 12 {
                Biome::TemperateForest
            } else {
                continue;
            };
            graph.set_biome(node, biome);
        }
    }
    graph
}

pub fn config(seed: u64, debug_mode: bool) -> SimConfig {
    SimConfig {
        seed,
        debug_mode,
        ..SimConfig::default()
    }
}

pub fn gen_config(seed: u64) -> WorldGenConfig {
    WorldGenConfig {
        seed,
        ..WorldGenConfig::default()
    }
}

pub fn build_world(seed: u64, debug_mode: bool) -> App {
    new_world_app(
        config(seed, debug_mode),
        &gen_config(seed),
        island(),
        factions(),
        &mut BiomeNames,
    )
}

/// Build a world where the first two contestants already hate each other,
/// so the war flag goes up on the first tick.
pub fn build_world_at_war(seed: u64, debug_mode: bool) -> App {
    let mut app = build_world(seed, debug_mode);
    app.world_mut()
        .resource_mut::<FactionManager>()
        .set_goodwill(FactionId(1), FactionId(2), -95);
    app
}

pub fn tick(app: &mut App, n: u64) {
    for _ in 0..n {
        app.world_mut().run_schedule(SimTick);
    }
}
