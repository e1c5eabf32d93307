//! World saves.
//!
//! A save is one JSON document holding everything the simulation owns plus the
//! host tables it reads (settlements, factions, goodwill), so it can be loaded
//! without any other file. Keyed tables are stored as parallel arrays; a
//! mismatch in their lengths is healed by truncation, never by failing the load.

mod jsonl;

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use bevy_app::App;
use bevy_ecs::world::World;
use serde::{Deserialize, Serialize};

use crate::ecs::app::build_sim_app;
use crate::ecs::clock::SimClock;
use crate::ecs::plugin::SimPlugin;
use crate::ecs::resources::{
    EventLog, FactionManager, SettlementRegistry, SimConfig, SimRng, WorldMap,
};
use crate::id::{FactionId, NodeId, SettlementId};
use crate::model::event::Event;
use crate::model::{Faction, GoodwillPair, Settlement, WorldGraph};
use crate::sim::diplomacy::RelationshipSim;
use crate::sim::strength::{FactionStrength, SettlementStrength};
use crate::sim::war::WarSession;
use crate::territory::TerritoryEngine;

pub use jsonl::export_chronicle;

/// Bumped whenever the layout changes incompatibly.
pub const SAVE_VERSION: u32 = 1;

/// Key → value table stored as two parallel arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelTable<K, V> {
    pub keys: Vec<K>,
    pub values: Vec<V>,
}

impl<K, V> Default for ParallelTable<K, V> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<K, V> ParallelTable<K, V> {
    pub fn from_entries(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        let (keys, values) = entries.into_iter().unzip();
        Self { keys, values }
    }

    /// Zip the arrays back together, dropping the tail of the longer one.
    pub fn into_entries(self, table: &str) -> Vec<(K, V)> {
        if self.keys.len() != self.values.len() {
            tracing::warn!(
                table,
                keys = self.keys.len(),
                values = self.values.len(),
                "mismatched save arrays, truncating"
            );
        }
        self.keys.into_iter().zip(self.values).collect()
    }
}

/// Faction pair → value table stored as three parallel arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairTable<V> {
    pub pair_a: Vec<FactionId>,
    pub pair_b: Vec<FactionId>,
    pub values: Vec<V>,
}

impl<V> Default for PairTable<V> {
    fn default() -> Self {
        Self {
            pair_a: Vec::new(),
            pair_b: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<V> PairTable<V> {
    pub fn from_entries(entries: impl IntoIterator<Item = (GoodwillPair, V)>) -> Self {
        let mut table = Self::default();
        for (pair, value) in entries {
            table.pair_a.push(pair.low());
            table.pair_b.push(pair.high());
            table.values.push(value);
        }
        table
    }

    /// Zip the arrays back together at the shortest length. Pairs come back
    /// canonical even if the save stored them the other way round.
    pub fn into_entries(self, table: &str) -> Vec<(GoodwillPair, V)> {
        let (a, b, v) = (self.pair_a.len(), self.pair_b.len(), self.values.len());
        if a != b || b != v {
            tracing::warn!(
                table,
                pair_a = a,
                pair_b = b,
                values = v,
                "mismatched save arrays, truncating"
            );
        }
        self.pair_a
            .into_iter()
            .zip(self.pair_b)
            .zip(self.values)
            .map(|((a, b), value)| (GoodwillPair::of(a, b), value))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipState {
    pub drift_interval: u64,
    pub elapsed: u64,
    pub initial_applied: bool,
    pub war_situation: bool,
    pub offsets: PairTable<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrengthState {
    pub factions: ParallelTable<FactionId, f64>,
    pub settlements: ParallelTable<SettlementId, f64>,
    pub growth_elapsed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveState {
    pub version: u32,
    pub seed: u64,
    pub tick: u64,
    pub factions: Vec<Faction>,
    pub goodwill: PairTable<i32>,
    pub settlements: Vec<Settlement>,
    pub next_settlement_id: u64,
    pub relationships: RelationshipState,
    pub strength: StrengthState,
    pub war: WarSession,
    /// Capital anchor tiles. Optional: anchors are re-drawn when missing.
    pub anchors: Option<ParallelTable<SettlementId, NodeId>>,
    pub events: Vec<Event>,
}

impl SaveState {
    /// Snapshot everything a world needs to resume from this tick.
    pub fn capture(world: &World) -> Self {
        let factions = world.resource::<FactionManager>();
        let registry = world.resource::<SettlementRegistry>();
        let relationships = world.resource::<RelationshipSim>();
        let faction_strength = world.resource::<FactionStrength>();
        let settlement_strength = world.resource::<SettlementStrength>();
        let territory = world.resource::<TerritoryEngine>();

        Self {
            version: SAVE_VERSION,
            seed: world.resource::<SimRng>().seed,
            tick: world.resource::<SimClock>().tick_count,
            factions: factions.all().cloned().collect(),
            goodwill: PairTable::from_entries(factions.goodwill_entries()),
            // Unowned settlements only exist mid-generation; they are never saved.
            settlements: registry.owned().cloned().collect(),
            next_settlement_id: registry.next_id(),
            relationships: RelationshipState {
                drift_interval: relationships.drift_interval,
                elapsed: relationships.elapsed,
                initial_applied: relationships.initial_applied,
                war_situation: relationships.war_situation,
                offsets: PairTable::from_entries(relationships.offsets()),
            },
            strength: StrengthState {
                factions: ParallelTable::from_entries(faction_strength.entries()),
                settlements: ParallelTable::from_entries(settlement_strength.entries()),
                growth_elapsed: settlement_strength.elapsed,
            },
            war: world.resource::<WarSession>().clone(),
            anchors: Some(ParallelTable::from_entries(territory.anchors())),
            events: world.resource::<EventLog>().events.clone(),
        }
    }

    /// Put the saved state into `world`, replacing what is there.
    ///
    /// This is the load-side finalize: goodwill offsets are not re-applied
    /// and strength is not recomputed, so the world resumes exactly where it
    /// was saved.
    pub fn restore(self, world: &mut World) {
        if self.version != SAVE_VERSION {
            tracing::warn!(
                found = self.version,
                expected = SAVE_VERSION,
                "save version differs, loading anyway"
            );
        }

        let mut factions = FactionManager::new();
        for faction in self.factions {
            if factions.get(faction.id).is_some() {
                tracing::warn!(faction = %faction.id, "duplicate faction in save skipped");
                continue;
            }
            factions.add(faction);
        }
        for (pair, value) in self.goodwill.into_entries("goodwill") {
            factions.set_goodwill(pair.low(), pair.high(), value);
        }

        let mut registry = SettlementRegistry::new();
        for settlement in self.settlements {
            if settlement.faction.is_none() || registry.contains(settlement.id) {
                tracing::warn!(settlement = %settlement.id, "unowned or duplicate settlement in save skipped");
                continue;
            }
            registry.insert(settlement);
        }
        registry.reserve_ids_below(self.next_settlement_id);

        let mut relationships = RelationshipSim::new();
        relationships.drift_interval = self.relationships.drift_interval;
        relationships.elapsed = self.relationships.elapsed;
        relationships.initial_applied = self.relationships.initial_applied;
        relationships.war_situation = self.relationships.war_situation;
        for (pair, offset) in self.relationships.offsets.into_entries("offsets") {
            relationships.set_offset(pair, offset);
        }

        let mut faction_strength = FactionStrength::new();
        for (faction, value) in self.strength.factions.into_entries("faction_strength") {
            faction_strength.set(faction, value);
        }
        let mut settlement_strength = SettlementStrength::new();
        for (settlement, value) in self.strength.settlements.into_entries("settlement_strength") {
            settlement_strength.set(settlement, value);
        }
        settlement_strength.elapsed = self.strength.growth_elapsed;

        let mut territory = TerritoryEngine::from_config(world.resource::<SimConfig>());
        for (capital, node) in self
            .anchors
            .map(|table| table.into_entries("anchors"))
            .unwrap_or_default()
        {
            if registry.get(capital).is_some_and(Settlement::is_capital) {
                territory.set_anchor(capital, node);
            }
        }

        tracing::info!(
            tick = self.tick,
            settlements = registry.len(),
            factions = factions.len(),
            "world restored"
        );

        world.resource_mut::<SimConfig>().seed = self.seed;
        world.insert_resource(SimRng::seeded(self.seed));
        world.insert_resource(SimClock::at_tick(self.tick));
        world.insert_resource(factions);
        world.insert_resource(registry);
        world.insert_resource(relationships);
        world.insert_resource(faction_strength);
        world.insert_resource(settlement_strength);
        world.insert_resource(self.war);
        world.insert_resource(territory);
        world.insert_resource(EventLog::from_events(self.events));
    }
}

/// Write a save of `world` to `path` as JSON.
pub fn save_world(world: &World, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &SaveState::capture(world))?;
    writer.flush()
}

pub fn load_save(path: &Path) -> io::Result<SaveState> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Build a ready-to-tick app from a save file on `graph`.
pub fn load_world_app(
    config: SimConfig,
    path: &Path,
    graph: impl WorldGraph + Send + Sync + 'static,
) -> io::Result<App> {
    let save = load_save(path)?;
    let mut app = build_sim_app(config);
    app.add_plugins(SimPlugin);
    let world = app.world_mut();
    world.insert_resource(WorldMap::new(graph));
    save.restore(world);
    Ok(app)
}
