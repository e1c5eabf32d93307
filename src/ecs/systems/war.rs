//! War system (Update phase, `DomainSet::War`, gated on `war_declared`).
//!
//! Steps the siege session once per tick and turns each outcome into a
//! command: launches, siege starts and repelled assaults are chronicled,
//! successful sieges become `CaptureSettlement`.

use bevy_app::{App, Plugin};
use bevy_ecs::message::MessageWriter;
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::system::{Res, ResMut};

use crate::ecs::clock::SimClock;
use crate::ecs::commands::{SimCommand, SimCommandKind};
use crate::ecs::conditions::war_declared;
use crate::ecs::resources::{FactionManager, SettlementRegistry, SimConfig, WarRng, WorldMap};
use crate::ecs::schedule::{DomainSet, SimTick};
use crate::ecs::time::{SimTime, TICKS_PER_DAY};
use crate::id::SettlementId;
use crate::model::event::{EventKind, ParticipantRole};
use crate::sim::strength::SettlementStrength;
use crate::sim::war::{WarContext, WarOutcome, WarSession};

pub struct WarPlugin;

impl Plugin for WarPlugin {
    fn build(&self, app: &mut App) {
        add_war_systems(app);
    }
}

pub fn add_war_systems(app: &mut App) {
    app.add_systems(
        SimTick,
        step_war.run_if(war_declared).in_set(DomainSet::War),
    );
}

#[allow(clippy::too_many_arguments)]
fn step_war(
    mut session: ResMut<WarSession>,
    registry: Res<SettlementRegistry>,
    factions: Res<FactionManager>,
    map: Res<WorldMap>,
    strength: Res<SettlementStrength>,
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    mut rng: ResMut<WarRng>,
    mut commands: MessageWriter<SimCommand>,
) {
    let ctx = WarContext {
        registry: &registry,
        factions: &factions,
        graph: &**map,
        strength: &strength,
        config: &config,
    };
    let Some(outcome) = session.step(&ctx, &mut rng.0) else {
        return;
    };
    if let Some(cmd) = outcome_command(&registry, clock.time, outcome) {
        commands.write(cmd);
    }
}

fn settlement_name(registry: &SettlementRegistry, id: SettlementId) -> String {
    registry
        .get(id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn outcome_command(
    registry: &SettlementRegistry,
    now: SimTime,
    outcome: WarOutcome,
) -> Option<SimCommand> {
    let name = |id| settlement_name(registry, id);
    let cmd = match outcome {
        WarOutcome::Launched {
            attacker,
            defender,
            travel_ticks,
        } => {
            let arrival = now.advanced(travel_ticks);
            tracing::info!(
                date = %now,
                attacker = %attacker,
                defender = %defender,
                travel_days = travel_ticks as f64 / TICKS_PER_DAY as f64,
                "siege launched"
            );
            SimCommand::chronicle(
                EventKind::SiegeLaunched,
                format!(
                    "An army marched from {} against {}, expected by {arrival}",
                    name(attacker),
                    name(defender)
                ),
            )
            .with_settlement(attacker, ParticipantRole::Attacker)
            .with_settlement(defender, ParticipantRole::Defender)
        }
        WarOutcome::SiegeBegun {
            attacker,
            defender,
            siege_ticks,
        } => {
            let until = now.advanced(siege_ticks);
            tracing::info!(
                date = %now,
                attacker = %attacker,
                defender = %defender,
                siege_ticks,
                "siege begun"
            );
            SimCommand::chronicle(
                EventKind::SiegeBegun,
                format!(
                    "The host of {} laid siege to {} until {until}",
                    name(attacker),
                    name(defender)
                ),
            )
            .with_settlement(attacker, ParticipantRole::Attacker)
            .with_settlement(defender, ParticipantRole::Defender)
        }
        WarOutcome::Captured {
            attacker,
            defender,
            new_faction,
            old_faction,
            probability,
        } => {
            tracing::info!(
                date = %now,
                attacker = %attacker,
                defender = %defender,
                new_faction = %new_faction,
                old_faction = %old_faction,
                probability,
                "settlement captured"
            );
            SimCommand::new(
                SimCommandKind::CaptureSettlement {
                    settlement: defender,
                    new_faction,
                },
                EventKind::Conquest,
                format!("{} fell to the host of {}", name(defender), name(attacker)),
            )
            .with_settlement(attacker, ParticipantRole::Attacker)
            .with_settlement(defender, ParticipantRole::Defender)
            .with_faction(new_faction, ParticipantRole::Subject)
            .with_faction(old_faction, ParticipantRole::Object)
        }
        WarOutcome::Repelled {
            attacker,
            defender,
            probability,
        } => {
            tracing::info!(
                date = %now,
                attacker = %attacker,
                defender = %defender,
                probability,
                "siege repelled"
            );
            SimCommand::chronicle(
                EventKind::SiegeRepelled,
                format!("{} held its walls against {}", name(defender), name(attacker)),
            )
            .with_settlement(attacker, ParticipantRole::Attacker)
            .with_settlement(defender, ParticipantRole::Defender)
        }
        WarOutcome::Aborted { phase } => {
            tracing::debug!(phase = %phase, "siege abandoned");
            return None;
        }
    };
    Some(cmd)
}
