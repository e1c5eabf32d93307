//! StrongPoint economy: per-faction aggregate strength and per-settlement
//! strength growth.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use bevy_ecs::resource::Resource;
use rand::{Rng, RngCore};

use super::logistic::sigmoid;
use crate::ecs::resources::{FactionManager, SettlementRegistry};
use crate::id::{FactionId, SettlementId};
use crate::model::Settlement;

const FACTION_JITTER: RangeInclusive<f64> = 0.8..=1.2;

/// Faction id → aggregate strength. Rebuilt from scratch, never patched.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct FactionStrength {
    values: BTreeMap<FactionId, f64>,
}

impl FactionStrength {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown factions have no strength.
    pub fn get(&self, faction: FactionId) -> f64 {
        self.values.get(&faction).copied().unwrap_or(0.0)
    }

    pub fn entries(&self) -> impl Iterator<Item = (FactionId, f64)> + '_ {
        self.values.iter().map(|(&id, &v)| (id, v))
    }

    pub fn set(&mut self, faction: FactionId, value: f64) {
        self.values.insert(faction, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Full rebuild: sum tier base strength per owning faction, make sure every
    /// visible faction has an entry, then scale each total by its own jitter.
    pub fn recalculate_all(
        &mut self,
        registry: &SettlementRegistry,
        factions: &FactionManager,
        rng: &mut dyn RngCore,
    ) {
        self.values.clear();
        for settlement in registry.owned() {
            let Some(owner) = settlement.faction else {
                continue;
            };
            if factions.is_hidden(owner) {
                continue;
            }
            *self.values.entry(owner).or_insert(0.0) += settlement.tier.base_strength();
        }
        for faction in factions.visible() {
            self.values.entry(faction.id).or_insert(0.0);
        }
        for value in self.values.values_mut() {
            *value *= rng.random_range(FACTION_JITTER);
        }
        tracing::debug!(factions = self.values.len(), "faction strength recalculated");
    }
}

/// Settlement id → running strength, plus the growth timer.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct SettlementStrength {
    values: BTreeMap<SettlementId, f64>,
    pub elapsed: u64,
}

impl SettlementStrength {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, settlement: SettlementId) -> Option<f64> {
        self.values.get(&settlement).copied()
    }

    /// Current strength, or the tier base if the settlement has no entry yet.
    pub fn current(&self, settlement: &Settlement) -> f64 {
        self.get(settlement.id)
            .unwrap_or_else(|| settlement.tier.base_strength())
    }

    pub fn entries(&self) -> impl Iterator<Item = (SettlementId, f64)> + '_ {
        self.values.iter().map(|(&id, &v)| (id, v))
    }

    pub fn set(&mut self, settlement: SettlementId, value: f64) {
        self.values.insert(settlement, value);
    }

    pub fn forget(&mut self, settlement: SettlementId) {
        self.values.remove(&settlement);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Seed every settlement at its tier base. Fresh worlds only.
    pub fn initialize(&mut self, registry: &SettlementRegistry) {
        for settlement in registry.all() {
            self.values
                .insert(settlement.id, settlement.tier.base_strength());
        }
    }

    /// One growth pass. Each owned settlement of a faction with positive
    /// strength gains `sigmoid(faction * current) * base`. There is no cap and
    /// captures do not reset it. Returns the number of settlements that grew.
    pub fn grow(&mut self, registry: &SettlementRegistry, factions: &FactionStrength) -> usize {
        let mut grown = 0;
        for settlement in registry.owned() {
            let Some(owner) = settlement.faction else {
                continue;
            };
            let faction_strength = factions.get(owner);
            if faction_strength <= 0.0 {
                continue;
            }
            let current = self.current(settlement);
            let gain = sigmoid(faction_strength * current) * settlement.tier.base_strength();
            self.values.insert(settlement.id, current + gain);
            grown += 1;
        }
        grown
    }

    /// Advance the growth timer by one tick; grows when `interval` elapses.
    pub fn tick(
        &mut self,
        interval: u64,
        registry: &SettlementRegistry,
        factions: &FactionStrength,
    ) -> bool {
        self.elapsed += 1;
        if self.elapsed < interval {
            return false;
        }
        self.elapsed = 0;
        let grown = self.grow(registry, factions);
        tracing::debug!(settlements = grown, "settlement strength growth pass");
        true
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::id::NodeId;
    use crate::model::{Faction, Tier};

    fn setup() -> (SettlementRegistry, FactionManager) {
        let mut factions = FactionManager::new();
        factions.add(Faction::new(FactionId(1), "Ashen Crown"));
        factions.add(Faction::new(FactionId(2), "River Pact"));
        factions.add(Faction::new(FactionId(3), "Veiled").hidden());
        factions.add(Faction::new(FactionId(4), "Empty Banner"));

        let mut registry = SettlementRegistry::new();
        registry.add("A (Capital)", NodeId(0), Tier::Capital, Some(FactionId(1)));
        registry.add("Amill Village", NodeId(1), Tier::Village, Some(FactionId(1)));
        registry.add("Bford", NodeId(2), Tier::LargeCity, Some(FactionId(2)));
        registry.add("Hidden", NodeId(3), Tier::SmallCity, Some(FactionId(3)));
        registry.add("Stray", NodeId(4), Tier::SmallCity, None);
        (registry, factions)
    }

    #[test]
    fn recalculate_sums_tiers_within_jitter() {
        let (registry, factions) = setup();
        let mut strength = FactionStrength::new();
        strength.recalculate_all(&registry, &factions, &mut SmallRng::seed_from_u64(1));

        let a = strength.get(FactionId(1));
        assert!((3.2 * 0.8..=3.2 * 1.2).contains(&a), "{a}");
        let b = strength.get(FactionId(2));
        assert!((2.0 * 0.8..=2.0 * 1.2).contains(&b), "{b}");
        assert_eq!(strength.get(FactionId(4)), 0.0);
        assert_eq!(strength.entries().count(), 3, "hidden faction excluded");
    }

    #[test]
    fn recalculate_is_a_full_rebuild() {
        let (mut registry, factions) = setup();
        let mut strength = FactionStrength::new();
        let mut rng = SmallRng::seed_from_u64(2);
        strength.recalculate_all(&registry, &factions, &mut rng);
        let city = registry.all_of_tier(Tier::LargeCity).next().unwrap().id;
        registry.set_faction(city, FactionId(1));
        strength.recalculate_all(&registry, &factions, &mut rng);
        assert_eq!(strength.get(FactionId(2)), 0.0);
        assert!(strength.get(FactionId(1)) >= 5.2 * 0.8);
    }

    #[test]
    fn growth_is_sigmoid_gated_and_monotonic() {
        let (registry, factions) = setup();
        let mut faction_strength = FactionStrength::new();
        faction_strength.recalculate_all(&registry, &factions, &mut SmallRng::seed_from_u64(3));
        let mut strength = SettlementStrength::new();
        strength.initialize(&registry);

        let capital = registry.all_of_tier(Tier::Capital).next().unwrap().clone();
        let before = strength.current(&capital);
        let expected_gain =
            sigmoid(faction_strength.get(FactionId(1)) * before) * Tier::Capital.base_strength();

        let grown = strength.grow(&registry, &faction_strength);
        assert_eq!(grown, 3, "capital, village and large city grow");
        assert!((strength.current(&capital) - (before + expected_gain)).abs() < 1e-9);

        let mut prev = strength.current(&capital);
        for _ in 0..50 {
            strength.grow(&registry, &faction_strength);
            let now = strength.current(&capital);
            assert!(now > prev);
            prev = now;
        }
    }

    #[test]
    fn zero_strength_faction_does_not_grow() {
        let (registry, factions) = setup();
        let mut faction_strength = FactionStrength::new();
        faction_strength.recalculate_all(&registry, &factions, &mut SmallRng::seed_from_u64(4));
        faction_strength.set(FactionId(2), 0.0);
        let mut strength = SettlementStrength::new();
        strength.initialize(&registry);
        strength.grow(&registry, &faction_strength);
        let city = registry.all_of_tier(Tier::LargeCity).next().unwrap();
        assert_eq!(strength.current(city), Tier::LargeCity.base_strength());
    }

    #[test]
    fn strengths_never_negative() {
        let (registry, factions) = setup();
        let mut rng = SmallRng::seed_from_u64(6);
        let mut faction_strength = FactionStrength::new();
        let mut strength = SettlementStrength::new();
        strength.initialize(&registry);
        for _ in 0..100 {
            faction_strength.recalculate_all(&registry, &factions, &mut rng);
            strength.grow(&registry, &faction_strength);
            assert!(faction_strength.entries().all(|(_, v)| v >= 0.0));
            assert!(strength.entries().all(|(_, v)| v >= 0.0));
        }
    }

    #[test]
    fn growth_waits_for_interval() {
        let (registry, factions) = setup();
        let mut faction_strength = FactionStrength::new();
        faction_strength.recalculate_all(&registry, &factions, &mut SmallRng::seed_from_u64(7));
        let mut strength = SettlementStrength::new();
        strength.initialize(&registry);
        let fired = (0..250)
            .filter(|_| strength.tick(100, &registry, &faction_strength))
            .count();
        assert_eq!(fired, 2);
        assert_eq!(strength.elapsed, 50);
    }

    #[test]
    fn missing_entry_reads_as_tier_base() {
        let (registry, _) = setup();
        let strength = SettlementStrength::new();
        let village = registry.all_of_tier(Tier::Village).next().unwrap();
        assert_eq!(strength.current(village), 0.7);
    }
}
