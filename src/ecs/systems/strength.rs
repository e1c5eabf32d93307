//! Strength systems:
//! 1. `grow_settlements` (Update phase, `DomainSet::Strength`) advances the
//!    growth timer and grows owned settlements when it elapses
//! 2. `refresh_faction_strength` (Reactions phase) rebuilds faction strength
//!    whenever a settlement changed hands or disappeared this tick

use bevy_app::{App, Plugin};
use bevy_ecs::message::MessageReader;
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::system::{Res, ResMut};

use crate::ecs::events::SimReactiveEvent;
use crate::ecs::resources::{FactionManager, SettlementRegistry, SimConfig, StrengthRng};
use crate::ecs::schedule::{DomainSet, SimPhase, SimTick};
use crate::sim::strength::{FactionStrength, SettlementStrength};

pub struct StrengthPlugin;

impl Plugin for StrengthPlugin {
    fn build(&self, app: &mut App) {
        add_strength_systems(app);
    }
}

pub fn add_strength_systems(app: &mut App) {
    app.add_systems(SimTick, grow_settlements.in_set(DomainSet::Strength));
    app.add_systems(
        SimTick,
        refresh_faction_strength.in_set(SimPhase::Reactions),
    );
}

fn grow_settlements(
    mut strength: ResMut<SettlementStrength>,
    registry: Res<SettlementRegistry>,
    factions: Res<FactionStrength>,
    config: Res<SimConfig>,
) {
    strength.tick(config.strength_growth_interval, &registry, &factions);
}

fn refresh_faction_strength(
    mut events: MessageReader<SimReactiveEvent>,
    mut faction_strength: ResMut<FactionStrength>,
    registry: Res<SettlementRegistry>,
    factions: Res<FactionManager>,
    mut rng: ResMut<StrengthRng>,
) {
    // Read everything so nothing lingers into the next tick.
    let changed = events
        .read()
        .filter(|event| {
            matches!(
                event,
                SimReactiveEvent::SettlementCaptured { .. }
                    | SimReactiveEvent::SettlementRemoved { .. }
            )
        })
        .count();
    if changed == 0 {
        return;
    }
    faction_strength.recalculate_all(&registry, &factions, &mut rng.0);
}
