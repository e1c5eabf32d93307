//! Diplomacy systems (Update phase, `DomainSet::Diplomacy`):
//! 1. `drift_goodwill` advances the drift timer and nudges every contestant pair
//! 2. `check_war_situation` raises the world's war flag once a visible pair
//!    falls to the war threshold

use bevy_app::{App, Plugin};
use bevy_ecs::message::MessageWriter;
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::system::{Res, ResMut};

use crate::ecs::commands::{SimCommand, SimCommandKind};
use crate::ecs::resources::{DiplomacyRng, FactionManager, SimConfig};
use crate::ecs::schedule::{DomainSet, SimTick};
use crate::id::FactionId;
use crate::model::event::{EventKind, ParticipantRole};
use crate::sim::diplomacy::RelationshipSim;

pub struct DiplomacyPlugin;

impl Plugin for DiplomacyPlugin {
    fn build(&self, app: &mut App) {
        add_diplomacy_systems(app);
    }
}

pub fn add_diplomacy_systems(app: &mut App) {
    app.add_systems(
        SimTick,
        (drift_goodwill, check_war_situation)
            .chain()
            .in_set(DomainSet::Diplomacy),
    );
}

fn drift_goodwill(
    mut relationships: ResMut<RelationshipSim>,
    mut factions: ResMut<FactionManager>,
    config: Res<SimConfig>,
    mut rng: ResMut<DiplomacyRng>,
) {
    let rng = &mut rng.0;
    // Loaded worlds carry their interval; anything else draws one on first use.
    relationships.ensure_interval(config.debug_mode, rng);
    relationships.tick(&mut factions, rng);
}

fn check_war_situation(
    mut relationships: ResMut<RelationshipSim>,
    factions: Res<FactionManager>,
    mut commands: MessageWriter<SimCommand>,
) {
    let Some(pair) = relationships.check_war_situation(&factions) else {
        return;
    };
    let (a, b) = (pair.low(), pair.high());
    let goodwill = factions.goodwill_between(a, b);
    let name = |id: FactionId| {
        factions
            .get(id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| id.to_string())
    };
    tracing::info!(a = %a, b = %b, goodwill, "the world enters a war situation");
    commands.write(
        SimCommand::new(
            SimCommandKind::DeclareWar { a, b },
            EventKind::WarSituation,
            format!(
                "Relations between {} and {} collapsed into open hostility",
                name(a),
                name(b)
            ),
        )
        .with_faction(a, ParticipantRole::Attacker)
        .with_faction(b, ParticipantRole::Defender),
    );
}
