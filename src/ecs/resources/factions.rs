use std::collections::BTreeMap;

use bevy_ecs::resource::Resource;

use crate::id::FactionId;
use crate::model::{Faction, GoodwillPair, clamp_goodwill};

/// Host-side faction table plus the pairwise goodwill scores.
///
/// Goodwill is clamped to [-100, 100] here, by the accessor, not by callers.
#[derive(Resource, Debug, Clone, Default)]
pub struct FactionManager {
    factions: BTreeMap<FactionId, Faction>,
    goodwill: BTreeMap<GoodwillPair, i32>,
}

impl FactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, faction: Faction) {
        let id = faction.id;
        let prev = self.factions.insert(id, faction);
        assert!(prev.is_none(), "duplicate {id} in FactionManager");
    }

    pub fn get(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(&id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Faction> {
        self.factions.values()
    }

    /// Non-hidden factions.
    pub fn visible(&self) -> impl Iterator<Item = &Faction> {
        self.factions.values().filter(|f| !f.hidden)
    }

    /// Non-hidden, non-player factions.
    pub fn contestants(&self) -> impl Iterator<Item = &Faction> {
        self.factions.values().filter(|f| f.contests_territory())
    }

    pub fn player(&self) -> Option<FactionId> {
        self.factions.values().find(|f| f.is_player).map(|f| f.id)
    }

    /// Unknown factions count as hidden.
    pub fn is_hidden(&self, id: FactionId) -> bool {
        self.factions.get(&id).is_none_or(|f| f.hidden)
    }

    pub fn contests_territory(&self, id: FactionId) -> bool {
        self.factions.get(&id).is_some_and(Faction::contests_territory)
    }

    pub fn goodwill_between(&self, a: FactionId, b: FactionId) -> i32 {
        self.goodwill
            .get(&GoodwillPair::of(a, b))
            .copied()
            .unwrap_or(0)
    }

    /// Shift goodwill by `delta`. Returns the change actually applied after clamping.
    pub fn adjust_goodwill(&mut self, a: FactionId, b: FactionId, delta: i32) -> i32 {
        if a == b {
            return 0;
        }
        let entry = self.goodwill.entry(GoodwillPair::of(a, b)).or_insert(0);
        let before = *entry;
        *entry = clamp_goodwill(before.saturating_add(delta));
        *entry - before
    }

    pub fn set_goodwill(&mut self, a: FactionId, b: FactionId, value: i32) {
        if a != b {
            self.goodwill
                .insert(GoodwillPair::of(a, b), clamp_goodwill(value));
        }
    }

    pub fn goodwill_entries(&self) -> impl Iterator<Item = (GoodwillPair, i32)> + '_ {
        self.goodwill.iter().map(|(&pair, &value)| (pair, value))
    }

    pub fn len(&self) -> usize {
        self.factions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }
}
