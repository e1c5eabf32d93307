use std::collections::BTreeMap;

use bevy_ecs::resource::Resource;

use crate::id::{FactionId, IdGenerator, NodeId, SettlementId};
use crate::model::{Settlement, Tier};

/// All settlements in the world, keyed by stable id. Iteration is in id order,
/// which keeps every pass over the registry deterministic.
#[derive(Resource, Debug, Clone, Default)]
pub struct SettlementRegistry {
    settlements: BTreeMap<SettlementId, Settlement>,
    id_gen: IdGenerator,
}

impl SettlementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a settlement and return its new id.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        node: NodeId,
        tier: Tier,
        faction: Option<FactionId>,
    ) -> SettlementId {
        let id = self.id_gen.next_settlement();
        self.settlements.insert(
            id,
            Settlement {
                id,
                name: name.into(),
                node,
                tier,
                faction,
            },
        );
        id
    }

    /// Insert an existing settlement (e.g. from a save). Panics if the id is taken.
    pub fn insert(&mut self, settlement: Settlement) {
        let id = settlement.id;
        self.id_gen.observe(id);
        let prev = self.settlements.insert(id, settlement);
        assert!(prev.is_none(), "duplicate {id} in SettlementRegistry");
    }

    pub fn remove(&mut self, id: SettlementId) -> Option<Settlement> {
        self.settlements.remove(&id)
    }

    pub fn get(&self, id: SettlementId) -> Option<&Settlement> {
        self.settlements.get(&id)
    }

    pub fn get_mut(&mut self, id: SettlementId) -> Option<&mut Settlement> {
        self.settlements.get_mut(&id)
    }

    pub fn contains(&self, id: SettlementId) -> bool {
        self.settlements.contains_key(&id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.values()
    }

    pub fn all_of_tier(&self, tier: Tier) -> impl Iterator<Item = &Settlement> {
        self.settlements.values().filter(move |s| s.tier == tier)
    }

    pub fn ids(&self) -> Vec<SettlementId> {
        self.settlements.keys().copied().collect()
    }

    pub fn owned(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.values().filter(|s| s.faction.is_some())
    }

    pub fn owned_by(&self, faction: FactionId) -> impl Iterator<Item = &Settlement> {
        self.settlements
            .values()
            .filter(move |s| s.is_owned_by(faction))
    }

    pub fn occupies(&self, node: NodeId) -> bool {
        self.settlements.values().any(|s| s.node == node)
    }

    /// Change ownership. Returns the previous owner, or `None` if the settlement
    /// does not exist.
    pub fn set_faction(
        &mut self,
        id: SettlementId,
        faction: FactionId,
    ) -> Option<Option<FactionId>> {
        let settlement = self.settlements.get_mut(&id)?;
        Some(settlement.faction.replace(faction))
    }

    pub fn rename(&mut self, id: SettlementId, name: String) {
        if let Some(settlement) = self.settlements.get_mut(&id) {
            settlement.name = name;
        }
    }

    /// Raw value of the next id to be handed out.
    pub fn next_id(&self) -> u64 {
        self.id_gen.peek()
    }

    /// Never hand out ids below `next`, even ones no live settlement holds.
    pub fn reserve_ids_below(&mut self, next: u64) {
        if next > 0 {
            self.id_gen.observe(SettlementId(next - 1));
        }
    }

    pub fn len(&self) -> usize {
        self.settlements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settlements.is_empty()
    }
}
