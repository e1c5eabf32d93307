//! Settlement-to-faction assignment.
//!
//! Capitals anchor territory: a new settlement joins the faction of the capital
//! it falls in range of, ties are broken by path distance to each capital's
//! anchor tile, and settlements nobody can claim are discarded.

mod assign;
mod capitals;
mod dominance;
pub mod names;
mod villages;

use std::collections::BTreeMap;

use bevy_ecs::resource::Resource;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use crate::ecs::resources::{EventLog, FactionManager, SettlementRegistry, SimConfig};
use crate::id::{FactionId, NodeId, SettlementId};
use crate::model::event::{EventKind, Participant, ParticipantRole};
use crate::model::{CAPITAL_MARKER, Settlement, Tier, WorldGraph};

pub use capitals::CapitalDemotion;
pub use dominance::DOMINANCE_RADIUS;
pub use names::{BiomeNames, NameGenerator, name_for};

/// Breadth-first reach used to pick a capital's anchor tile.
pub const ANCHOR_HOPS: u32 = 4;

/// Everything a territory operation reads or mutates besides the engine itself.
pub struct TerritoryContext<'a> {
    pub registry: &'a mut SettlementRegistry,
    pub factions: &'a FactionManager,
    pub graph: &'a dyn WorldGraph,
    pub names: &'a mut dyn NameGenerator,
    pub log: &'a mut EventLog,
    pub rng: &'a mut dyn RngCore,
    /// Tick stamped on log entries.
    pub tick: u64,
}

impl TerritoryContext<'_> {
    fn record(
        &mut self,
        kind: EventKind,
        description: String,
        participants: Vec<(Participant, ParticipantRole)>,
    ) {
        self.log.record(kind, self.tick, description, participants);
    }

    /// Hand `settlement` to `faction` and give it a fresh tier-conformant name.
    ///
    /// A capital that changes hands is renamed without the capital marker, so
    /// duplicate repair later demotes it rather than its new owner's own seat.
    fn claim(&mut self, settlement: SettlementId, faction: FactionId) {
        let Some(previous) = self.registry.set_faction(settlement, faction) else {
            return;
        };
        let Some(current) = self.registry.get(settlement).cloned() else {
            return;
        };
        let biome = self.graph.biome(current.node);
        let mut name = name_for(&mut *self.names, &current, biome, &mut *self.rng);
        if current.is_capital() && previous.is_some_and(|old| old != faction) {
            name = unmarked_capital_name(&name);
        }
        self.registry.rename(settlement, name);
    }

    /// A random node fit for a new settlement: dry land, not ice, unoccupied.
    /// Gives up after `2 × node_count` draws.
    pub fn random_open_node(&mut self) -> Option<NodeId> {
        let attempts = self.graph.node_count() * 2;
        for _ in 0..attempts {
            let node = self.graph.random_node(&mut *self.rng)?;
            if self.is_open(node) {
                return Some(node);
            }
        }
        None
    }

    pub fn is_open(&self, node: NodeId) -> bool {
        !self.graph.is_water(node)
            && !self.graph.biome(node).is_ice()
            && !self.registry.occupies(node)
    }

    /// Create a settlement and name it by the tier convention.
    fn found(&mut self, node: NodeId, tier: Tier, faction: Option<FactionId>) -> SettlementId {
        let id = self.registry.add(String::new(), node, tier, faction);
        if let Some(created) = self.registry.get(id).cloned() {
            let biome = self.graph.biome(node);
            let name = name_for(&mut *self.names, &created, biome, &mut *self.rng);
            self.registry.rename(id, name);
        }
        id
    }

    /// Remove a settlement nobody could claim.
    fn discard(&mut self, settlement: SettlementId) -> Option<Settlement> {
        let removed = self.registry.remove(settlement)?;
        tracing::debug!(settlement = %removed.id, name = %removed.name, "settlement discarded");
        self.record(
            EventKind::SettlementDiscarded,
            format!("{} was abandoned before any faction claimed it", removed.name),
            vec![(Participant::Settlement(removed.id), ParticipantRole::Subject)],
        );
        Some(removed)
    }
}

/// Territory assignment state: the capital radius bounds and the memoized
/// anchor tile per capital.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TerritoryEngine {
    pub radius_min: u32,
    pub radius_max: u32,
    anchors: BTreeMap<SettlementId, NodeId>,
}

impl Default for TerritoryEngine {
    fn default() -> Self {
        Self::with_radius(20, 40)
    }
}

impl TerritoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_radius(min: u32, max: u32) -> Self {
        Self {
            radius_min: min.min(max),
            radius_max: min.max(max),
            anchors: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::with_radius(config.capital_radius_min, config.capital_radius_max)
    }

    /// Capital radius for one assignment call.
    pub fn draw_radius(&self, rng: &mut dyn RngCore) -> f64 {
        rng.random_range(self.radius_min..=self.radius_max) as f64
    }

    /// Anchor tile for `capital`, picked once and reused for the capital's
    /// lifetime. Falls back to the capital's own node when nothing is in reach.
    pub fn anchor_for(
        &mut self,
        capital: &Settlement,
        graph: &dyn WorldGraph,
        rng: &mut dyn RngCore,
    ) -> NodeId {
        if let Some(&anchor) = self.anchors.get(&capital.id) {
            return anchor;
        }
        let candidates = graph.nodes_within_hops(capital.node, ANCHOR_HOPS);
        let anchor = candidates.choose(rng).copied().unwrap_or(capital.node);
        self.anchors.insert(capital.id, anchor);
        anchor
    }

    pub fn anchor(&self, capital: SettlementId) -> Option<NodeId> {
        self.anchors.get(&capital).copied()
    }

    pub fn anchors(&self) -> impl Iterator<Item = (SettlementId, NodeId)> + '_ {
        self.anchors.iter().map(|(&id, &node)| (id, node))
    }

    pub fn set_anchor(&mut self, capital: SettlementId, node: NodeId) {
        self.anchors.insert(capital, node);
    }

    /// Drop the memoized anchor of a capital that no longer exists.
    pub fn forget_anchor(&mut self, capital: SettlementId) {
        self.anchors.remove(&capital);
    }
}

fn unmarked_capital_name(name: &str) -> String {
    name.strip_suffix(CAPITAL_MARKER).unwrap_or(name).to_string()
}
