mod common;

use std::collections::BTreeSet;

use dominion_sim::ecs::resources::{EventLog, FactionManager, SettlementRegistry, WorldMap};
use dominion_sim::model::{CAPITAL_MARKER, EventKind, Tier};
use dominion_sim::sim::diplomacy::RelationshipSim;
use dominion_sim::sim::strength::{FactionStrength, SettlementStrength};
use dominion_sim::{FactionId, SettlementId};
use dominion_sim::model::Participant;

#[test]
fn every_settlement_belongs_to_a_contestant() {
    let app = common::build_world(5, false);
    let world = app.world();
    let registry = world.resource::<SettlementRegistry>();
    let factions = world.resource::<FactionManager>();
    assert!(registry.len() > 10, "only {} settlements", registry.len());
    for settlement in registry.all() {
        let owner = settlement.faction.expect("generated settlements are owned");
        assert!(factions.contests_territory(owner), "{} owned by {owner}", settlement.name);
    }
    assert_eq!(registry.owned_by(FactionId(8)).count(), 0);
    assert_eq!(registry.owned_by(FactionId(9)).count(), 0);
}

/// Settlements that changed hands during the dominance pass.
fn reassigned(log: &EventLog) -> BTreeSet<SettlementId> {
    log.of_kind(EventKind::FactionReassigned)
        .flat_map(|event| &event.participants)
        .filter_map(|(participant, _)| match participant {
            Participant::Settlement(id) => Some(*id),
            _ => None,
        })
        .collect()
}

#[test]
fn one_capital_per_contestant() {
    let app = common::build_world(6, false);
    let world = app.world();
    let registry = world.resource::<SettlementRegistry>();
    let flipped = reassigned(world.resource::<EventLog>());
    let mut seen = BTreeSet::new();
    for capital in registry.all_of_tier(Tier::Capital) {
        let owner = capital.faction.unwrap();
        assert!(seen.insert(owner), "{owner} has two capitals");
        // Only a founding seat keeps the marker.
        assert_eq!(
            capital.name.ends_with(CAPITAL_MARKER),
            !flipped.contains(&capital.id),
            "{}",
            capital.name
        );
    }
    assert!(seen.len() <= 3);
}

#[test]
fn settlements_sit_on_open_dry_land() {
    let app = common::build_world(7, false);
    let world = app.world();
    let registry = world.resource::<SettlementRegistry>();
    let map = world.resource::<WorldMap>();
    let mut nodes = BTreeSet::new();
    for settlement in registry.all() {
        assert!(!map.is_water(settlement.node), "{} in the sea", settlement.name);
        assert!(!map.biome(settlement.node).is_ice(), "{} on ice", settlement.name);
        assert!(nodes.insert(settlement.node), "two settlements on {}", settlement.node);
    }
}

#[test]
fn names_follow_tier_conventions() {
    let app = common::build_world(8, false);
    let world = app.world();
    let registry = world.resource::<SettlementRegistry>();
    let flipped = reassigned(world.resource::<EventLog>());
    for settlement in registry.all() {
        let name = &settlement.name;
        match settlement.tier {
            Tier::Capital => {
                assert!(!name.contains(" Village"), "{name}");
                assert!(name.ends_with(CAPITAL_MARKER) || flipped.contains(&settlement.id), "{name}");
            }
            Tier::Village => assert!(name.ends_with(" Village") && !name.contains(CAPITAL_MARKER)),
            Tier::LargeCity | Tier::SmallCity => {
                assert!(!name.contains(CAPITAL_MARKER) && !name.ends_with(" Village"), "{name}")
            }
        }
    }
    assert!(registry.all_of_tier(Tier::Village).count() > 0);
}

#[test]
fn fresh_world_is_finalized_once() {
    let app = common::build_world(9, false);
    let world = app.world();
    let registry = world.resource::<SettlementRegistry>();
    let relationships = world.resource::<RelationshipSim>();
    assert!(relationships.initial_applied);
    assert!(!relationships.war_situation);

    let strength = world.resource::<SettlementStrength>();
    for settlement in registry.all() {
        assert_eq!(strength.get(settlement.id), Some(settlement.tier.base_strength()));
    }

    let fs = world.resource::<FactionStrength>();
    for faction in [1, 2, 3] {
        let id = FactionId(faction);
        let base: f64 = registry.owned_by(id).map(|s| s.tier.base_strength()).sum();
        let value = fs.get(id);
        assert!(value >= 0.8 * base - 1e-9 && value <= 1.2 * base + 1e-9, "{id}: {value} vs {base}");
    }
    assert_eq!(fs.get(FactionId(8)), 0.0);
    assert!(world.resource::<EventLog>().of_kind(EventKind::SettlementFounded).count() > 0);
}

#[test]
fn generation_is_deterministic() {
    let layout = |seed| {
        let app = common::build_world(seed, false);
        let world = app.world();
        let settlements: Vec<_> = world.resource::<SettlementRegistry>().all().cloned().collect();
        let goodwill: Vec<_> = world.resource::<FactionManager>().goodwill_entries().collect();
        (settlements, goodwill)
    };
    assert_eq!(layout(21), layout(21));
    assert_ne!(layout(21), layout(22));
}
