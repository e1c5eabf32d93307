//! Siege state machine: one attacker/defender session per world.
//!
//! ```text
//! Idle ──launch──▶ Traveling ──arrive──▶ Besieging ──expire──▶ (resolve) ──▶ Idle
//!   └────── debug mode: launch straight into an instant siege ──────┘
//! ```
//!
//! Every failed lookup aborts back to Idle without raising anything.

use std::ops::Range;

use bevy_ecs::resource::Resource;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::logistic::sigmoid;
use super::strength::SettlementStrength;
use crate::ecs::resources::{FactionManager, SettlementRegistry, SimConfig};
use crate::ecs::time::TICKS_PER_DAY;
use crate::id::{FactionId, SettlementId};
use crate::model::{Settlement, WorldGraph};

const LAUNCH_INTERVAL_DAYS: Range<f64> = 2.0..10.0;
const DEBUG_LAUNCH_INTERVAL: u64 = 1;
/// Caravans cover six tiles per day.
const TRAVEL_TILES_PER_DAY: f64 = 6.0;
const SIEGE_UNITS: Range<u64> = 1..5;
const SIEGE_UNIT_TICKS: u64 = 25_000;
/// A settlement on campaign fields a tenth of its garrison strength.
const CAMPAIGN_DIVISOR: f64 = 10.0;
const CAPTURE_STEEPNESS: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SiegePhase {
    #[default]
    Idle,
    Traveling,
    Besieging,
}

string_enum!(SiegePhase {
    Idle => "idle",
    Traveling => "traveling",
    Besieging => "besieging",
});

/// What happened during one step of the session, for logging and commands.
#[derive(Debug, Clone, PartialEq)]
pub enum WarOutcome {
    Launched {
        attacker: SettlementId,
        defender: SettlementId,
        travel_ticks: u64,
    },
    SiegeBegun {
        attacker: SettlementId,
        defender: SettlementId,
        siege_ticks: u64,
    },
    Captured {
        attacker: SettlementId,
        defender: SettlementId,
        new_faction: FactionId,
        old_faction: FactionId,
        probability: f64,
    },
    Repelled {
        attacker: SettlementId,
        defender: SettlementId,
        probability: f64,
    },
    Aborted {
        phase: SiegePhase,
    },
}

/// Read-only view of the world a war step needs.
pub struct WarContext<'a> {
    pub registry: &'a SettlementRegistry,
    pub factions: &'a FactionManager,
    pub graph: &'a dyn WorldGraph,
    pub strength: &'a SettlementStrength,
    pub config: &'a SimConfig,
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarSession {
    pub phase: SiegePhase,
    /// Ticks between launch attempts while idle; 0 until drawn.
    pub launch_interval: u64,
    pub idle_elapsed: u64,
    pub travel_elapsed: u64,
    pub travel_ticks: u64,
    pub siege_elapsed: u64,
    pub siege_ticks: u64,
    pub attacker: Option<SettlementId>,
    pub defender: Option<SettlementId>,
    /// Attacker's campaign strength captured at launch.
    pub campaign_strength: f64,
}

/// Travel time for a caravan covering `distance` path-weighted tiles.
pub fn travel_ticks(distance: f64) -> u64 {
    (TICKS_PER_DAY as f64 * distance / TRAVEL_TILES_PER_DAY).round() as u64
}

/// Strength an attacker brings to a siege, as opposed to what it holds at home.
pub fn campaign_strength(garrison_strength: f64) -> f64 {
    garrison_strength / CAMPAIGN_DIVISOR
}

/// Chance that a siege ends in capture given `attacker - defender` strength.
pub fn capture_probability(dynamic_strength: f64) -> f64 {
    sigmoid(CAPTURE_STEEPNESS * dynamic_strength)
}

/// Roll the siege outcome. Returns the probability and whether it captured.
pub fn roll_capture(
    campaign: f64,
    defender_strength: f64,
    rng: &mut dyn RngCore,
) -> (f64, bool) {
    let probability = capture_probability(campaign - defender_strength);
    (probability, rng.random::<f64>() < probability)
}

fn contesting<'a>(
    registry: &'a SettlementRegistry,
    factions: &FactionManager,
) -> Vec<&'a Settlement> {
    registry
        .owned()
        .filter(|s| s.faction.is_some_and(|f| factions.contests_territory(f)))
        .collect()
}

fn nearest<'a>(
    graph: &dyn WorldGraph,
    from: &Settlement,
    candidates: impl Iterator<Item = &'a Settlement>,
) -> Option<&'a Settlement> {
    candidates
        .map(|s| (graph.approx_distance(from.node, s.node), s))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, s)| s)
}

/// Pick an attacker/defender pair.
///
/// A random contesting settlement picks the nearest foreign settlement as the
/// defender. The attacker is then re-picked near that defender: a random
/// foreign settlement within `proximity` if any, otherwise the nearest one.
pub fn select_combatants(
    registry: &SettlementRegistry,
    factions: &FactionManager,
    graph: &dyn WorldGraph,
    proximity: f64,
    rng: &mut dyn RngCore,
) -> Option<(SettlementId, SettlementId)> {
    let eligible = contesting(registry, factions);
    if eligible.len() < 2 {
        return None;
    }
    let provisional = *eligible.choose(rng)?;
    let defender = nearest(
        graph,
        provisional,
        eligible
            .iter()
            .copied()
            .filter(|s| s.faction != provisional.faction),
    )?;

    let foreign: Vec<&Settlement> = eligible
        .iter()
        .copied()
        .filter(|s| s.faction != defender.faction)
        .collect();
    let nearby: Vec<&Settlement> = foreign
        .iter()
        .copied()
        .filter(|s| graph.approx_distance(s.node, defender.node) <= proximity)
        .collect();
    let attacker = match nearby.choose(rng) {
        Some(&s) => s,
        None => nearest(graph, defender, foreign.into_iter())?,
    };
    Some((attacker.id, defender.id))
}

impl WarSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.phase != SiegePhase::Idle
    }

    fn clear(&mut self) {
        self.phase = SiegePhase::Idle;
        self.travel_elapsed = 0;
        self.travel_ticks = 0;
        self.siege_elapsed = 0;
        self.siege_ticks = 0;
        self.attacker = None;
        self.defender = None;
        self.campaign_strength = 0.0;
    }

    fn abort(&mut self) -> Option<WarOutcome> {
        let phase = self.phase;
        self.clear();
        Some(WarOutcome::Aborted { phase })
    }

    /// Attacker and defender, if both still exist and still belong to
    /// different factions that contest territory. A side taken by the player
    /// mid-campaign ends the session.
    fn combatants<'a>(&self, ctx: &WarContext<'a>) -> Option<(&'a Settlement, &'a Settlement)> {
        let attacker = ctx.registry.get(self.attacker?)?;
        let defender = ctx.registry.get(self.defender?)?;
        match (attacker.faction, defender.faction) {
            (Some(a), Some(d))
                if a != d
                    && ctx.factions.contests_territory(a)
                    && ctx.factions.contests_territory(d) =>
            {
                Some((attacker, defender))
            }
            _ => None,
        }
    }

    /// Advance the session by one tick. Only called while the world is at war.
    pub fn step(&mut self, ctx: &WarContext, rng: &mut dyn RngCore) -> Option<WarOutcome> {
        match self.phase {
            SiegePhase::Idle => self.step_idle(ctx, rng),
            SiegePhase::Traveling => self.step_traveling(ctx, rng),
            SiegePhase::Besieging => self.step_besieging(ctx, rng),
        }
    }

    fn step_idle(&mut self, ctx: &WarContext, rng: &mut dyn RngCore) -> Option<WarOutcome> {
        if self.launch_interval == 0 {
            self.launch_interval = if ctx.config.debug_mode {
                DEBUG_LAUNCH_INTERVAL
            } else {
                (rng.random_range(LAUNCH_INTERVAL_DAYS) * TICKS_PER_DAY as f64).round() as u64
            };
        }
        self.idle_elapsed += 1;
        if self.idle_elapsed < self.launch_interval {
            return None;
        }
        self.idle_elapsed = 0;

        let (attacker_id, defender_id) = select_combatants(
            ctx.registry,
            ctx.factions,
            ctx.graph,
            ctx.config.war_proximity_radius,
            rng,
        )?;
        let attacker = ctx.registry.get(attacker_id)?;
        let defender = ctx.registry.get(defender_id)?;

        self.attacker = Some(attacker_id);
        self.defender = Some(defender_id);
        self.campaign_strength = campaign_strength(ctx.strength.current(attacker));

        if ctx.config.debug_mode {
            // Debug worlds skip the march and settle the siege on the spot.
            self.phase = SiegePhase::Besieging;
            return self.resolve(ctx, rng);
        }

        let Some(distance) = ctx.graph.traversal_distance(attacker.node, defender.node) else {
            return self.abort();
        };
        self.phase = SiegePhase::Traveling;
        self.travel_elapsed = 0;
        self.travel_ticks = travel_ticks(distance);
        Some(WarOutcome::Launched {
            attacker: attacker_id,
            defender: defender_id,
            travel_ticks: self.travel_ticks,
        })
    }

    fn step_traveling(&mut self, ctx: &WarContext, rng: &mut dyn RngCore) -> Option<WarOutcome> {
        if self.combatants(ctx).is_none() {
            return self.abort();
        }
        self.travel_elapsed += 1;
        if self.travel_elapsed < self.travel_ticks {
            return None;
        }
        self.phase = SiegePhase::Besieging;
        self.siege_elapsed = 0;
        self.siege_ticks = rng.random_range(SIEGE_UNITS) * SIEGE_UNIT_TICKS;
        Some(WarOutcome::SiegeBegun {
            attacker: self.attacker?,
            defender: self.defender?,
            siege_ticks: self.siege_ticks,
        })
    }

    fn step_besieging(&mut self, ctx: &WarContext, rng: &mut dyn RngCore) -> Option<WarOutcome> {
        if self.combatants(ctx).is_none() {
            return self.abort();
        }
        self.siege_elapsed += 1;
        if self.siege_elapsed < self.siege_ticks {
            return None;
        }
        self.resolve(ctx, rng)
    }

    /// Settle the siege and return to Idle whatever the result.
    fn resolve(&mut self, ctx: &WarContext, rng: &mut dyn RngCore) -> Option<WarOutcome> {
        let Some((attacker, defender)) = self.combatants(ctx) else {
            return self.abort();
        };
        let (Some(new_faction), Some(old_faction)) = (attacker.faction, defender.faction) else {
            return self.abort();
        };
        let (probability, captured) = roll_capture(
            self.campaign_strength,
            ctx.strength.current(defender),
            rng,
        );
        let outcome = if captured {
            WarOutcome::Captured {
                attacker: attacker.id,
                defender: defender.id,
                new_faction,
                old_faction,
                probability,
            }
        } else {
            WarOutcome::Repelled {
                attacker: attacker.id,
                defender: defender.id,
                probability,
            }
        };
        self.clear();
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::id::NodeId;
    use crate::model::{Biome, Faction, Tier, TileGraph};

    struct Fixture {
        registry: SettlementRegistry,
        factions: FactionManager,
        graph: TileGraph,
        strength: SettlementStrength,
        config: SimConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let mut factions = FactionManager::new();
            factions.add(Faction::new(FactionId(1), "Ashen Crown"));
            factions.add(Faction::new(FactionId(2), "River Pact"));
            factions.add(Faction::new(FactionId(3), "Veiled").hidden());
            factions.add(Faction::new(FactionId(4), "Colony").player());
            Self {
                registry: SettlementRegistry::new(),
                factions,
                graph: TileGraph::line(60, Biome::Grassland),
                strength: SettlementStrength::new(),
                config: SimConfig::default(),
            }
        }

        fn add(&mut self, node: u32, tier: Tier, faction: u32) -> SettlementId {
            self.registry
                .add(format!("S{node}"), NodeId(node), tier, Some(FactionId(faction)))
        }

        fn ctx(&self) -> WarContext<'_> {
            WarContext {
                registry: &self.registry,
                factions: &self.factions,
                graph: &self.graph,
                strength: &self.strength,
                config: &self.config,
            }
        }
    }

    #[test]
    fn capture_probability_extremes() {
        assert!(capture_probability(1_000.0) >= 0.999);
        assert!(capture_probability(-1_000.0) <= 0.001);
        assert_eq!(capture_probability(0.0), 0.5);
    }

    #[test]
    fn overwhelming_attacker_almost_always_captures() {
        let mut rng = SmallRng::seed_from_u64(21);
        let trials = 5_000;
        let captures = (0..trials)
            .filter(|_| roll_capture(1_000.0, 0.0, &mut rng).1)
            .count();
        assert!(captures as f64 / trials as f64 >= 0.999);

        let captures = (0..trials)
            .filter(|_| roll_capture(0.0, 1_000.0, &mut rng).1)
            .count();
        assert!(captures as f64 / trials as f64 <= 0.001);
    }

    #[test]
    fn campaign_strength_is_a_tenth() {
        assert_eq!(campaign_strength(25.0), 2.5);
    }

    #[test]
    fn travel_time_scales_with_distance() {
        assert_eq!(travel_ticks(6.0), TICKS_PER_DAY);
        assert_eq!(travel_ticks(0.0), 0);
        assert!(travel_ticks(30.0) > travel_ticks(12.0));
    }

    #[test]
    fn selection_needs_two_factions() {
        let mut fx = Fixture::new();
        fx.add(0, Tier::Capital, 1);
        fx.add(5, Tier::SmallCity, 1);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            select_combatants(&fx.registry, &fx.factions, &fx.graph, 10.0, &mut rng),
            None
        );
    }

    #[test]
    fn selection_ignores_hidden_and_player() {
        let mut fx = Fixture::new();
        fx.add(0, Tier::Capital, 1);
        fx.add(2, Tier::SmallCity, 3);
        fx.add(3, Tier::SmallCity, 4);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            select_combatants(&fx.registry, &fx.factions, &fx.graph, 10.0, &mut rng),
            None
        );
    }

    #[test]
    fn selection_pairs_foreign_neighbours() {
        let mut fx = Fixture::new();
        let a = fx.add(0, Tier::Capital, 1);
        let b = fx.add(4, Tier::SmallCity, 2);
        fx.add(50, Tier::LargeCity, 2);
        for seed in 0..30 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let (attacker, defender) =
                select_combatants(&fx.registry, &fx.factions, &fx.graph, 10.0, &mut rng).unwrap();
            let fa = fx.registry.get(attacker).unwrap().faction;
            let fd = fx.registry.get(defender).unwrap().faction;
            assert_ne!(fa, fd);
            assert!(
                (attacker, defender) == (a, b) || (attacker, defender) == (b, a),
                "far city never chosen as either side: {attacker} {defender}"
            );
        }
    }

    #[test]
    fn full_cycle_travels_besieges_and_resolves() {
        let mut fx = Fixture::new();
        let strong = fx.add(0, Tier::Capital, 1);
        let weak = fx.add(6, Tier::Village, 2);
        fx.strength.set(strong, 50_000.0);
        fx.strength.set(weak, 0.1);
        let mut session = WarSession::new();
        let mut rng = SmallRng::seed_from_u64(4);

        let mut launched = None;
        let mut begun = None;
        let mut resolved = None;
        for _ in 0..(20 * TICKS_PER_DAY) {
            match session.step(&fx.ctx(), &mut rng) {
                Some(WarOutcome::Launched {
                    attacker,
                    travel_ticks,
                    ..
                }) => launched = Some((attacker, travel_ticks)),
                Some(WarOutcome::SiegeBegun { siege_ticks, .. }) => begun = Some(siege_ticks),
                Some(WarOutcome::Aborted { phase }) => panic!("aborted in {phase}"),
                Some(outcome) => {
                    resolved = Some(outcome);
                    break;
                }
                None => {}
            }
        }
        let (attacker, travel) = launched.unwrap();
        assert_eq!(travel, TICKS_PER_DAY, "6 tiles is one day of travel");
        let siege_ticks = begun.unwrap();
        assert!(siege_ticks % SIEGE_UNIT_TICKS == 0);
        assert!((SIEGE_UNIT_TICKS..5 * SIEGE_UNIT_TICKS).contains(&siege_ticks));
        match resolved.unwrap() {
            WarOutcome::Captured {
                new_faction,
                old_faction,
                ..
            } => {
                assert_eq!(attacker, strong);
                assert_eq!(new_faction, FactionId(1));
                assert_eq!(old_faction, FactionId(2));
            }
            WarOutcome::Repelled { .. } => assert_eq!(attacker, weak),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(session.phase, SiegePhase::Idle);
        assert_eq!(session.attacker, None);
    }

    #[test]
    fn launch_interval_is_two_to_ten_days() {
        let fx = Fixture::new();
        for seed in 0..20 {
            let mut session = WarSession::new();
            session.step(&fx.ctx(), &mut SmallRng::seed_from_u64(seed));
            assert!(session.launch_interval >= 2 * TICKS_PER_DAY);
            assert!(session.launch_interval <= 10 * TICKS_PER_DAY);
        }
    }

    #[test]
    fn debug_mode_resolves_on_launch() {
        let mut fx = Fixture::new();
        fx.config.debug_mode = true;
        fx.add(0, Tier::Capital, 1);
        fx.add(6, Tier::Capital, 2);
        let mut session = WarSession::new();
        let outcome = session.step(&fx.ctx(), &mut SmallRng::seed_from_u64(2));
        assert!(matches!(
            outcome,
            Some(WarOutcome::Captured { .. } | WarOutcome::Repelled { .. })
        ));
        assert!(!session.is_active());
    }

    #[test]
    fn vanished_defender_aborts_siege() {
        let mut fx = Fixture::new();
        fx.add(0, Tier::Capital, 1);
        fx.add(6, Tier::SmallCity, 2);
        let mut session = WarSession::new();
        let mut rng = SmallRng::seed_from_u64(9);
        while session.phase != SiegePhase::Traveling {
            session.step(&fx.ctx(), &mut rng);
        }
        let defender = session.defender.unwrap();
        fx.registry.remove(defender);
        assert_eq!(
            session.step(&fx.ctx(), &mut rng),
            Some(WarOutcome::Aborted {
                phase: SiegePhase::Traveling
            })
        );
        assert_eq!(session, WarSession {
            launch_interval: session.launch_interval,
            ..WarSession::default()
        });
    }

    #[test]
    fn player_taking_a_side_aborts_the_campaign() {
        for (side, phase) in [(0, SiegePhase::Traveling), (1, SiegePhase::Besieging)] {
            let mut fx = Fixture::new();
            fx.add(0, Tier::Capital, 1);
            fx.add(6, Tier::SmallCity, 2);
            let mut session = WarSession::new();
            let mut rng = SmallRng::seed_from_u64(9);
            while session.phase != phase {
                session.step(&fx.ctx(), &mut rng);
            }
            let taken = if side == 0 {
                session.defender.unwrap()
            } else {
                session.attacker.unwrap()
            };
            fx.registry.set_faction(taken, FactionId(4));
            assert_eq!(
                session.step(&fx.ctx(), &mut rng),
                Some(WarOutcome::Aborted { phase })
            );
            assert!(!session.is_active());
            assert_eq!(fx.registry.get(taken).unwrap().faction, Some(FactionId(4)));
        }
    }

    #[test]
    fn unreachable_defender_aborts_launch() {
        let mut fx = Fixture::new();
        fx.graph.set_biome(NodeId(3), Biome::Ocean);
        fx.add(0, Tier::Capital, 1);
        fx.add(6, Tier::SmallCity, 2);
        let mut session = WarSession::new();
        let mut rng = SmallRng::seed_from_u64(9);
        let mut outcome = None;
        while outcome.is_none() {
            outcome = session.step(&fx.ctx(), &mut rng);
        }
        assert_eq!(
            outcome,
            Some(WarOutcome::Aborted {
                phase: SiegePhase::Idle
            })
        );
        assert!(!session.is_active());
    }
}
