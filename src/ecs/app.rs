use bevy_app::App;
use bevy_ecs::message::{MessageRegistry, Messages};
use bevy_ecs::schedule::{ExecutorKind, IntoScheduleConfigs};
use bevy_ecs::world::World;

use super::clock::SimClock;
use super::commands::{SimCommand, SimCommandKind, apply_sim_commands};
use super::events::SimReactiveEvent;
use super::plugin::SimPlugin;
use super::resources::{
    DiplomacyRng, EventLog, FactionManager, SettlementRegistry, SimConfig, SimRng, StrengthRng,
    WarRng, WorldMap, distribute_rng,
};
use super::schedule::{SimPhase, configure_sim_schedule};
use crate::id::{FactionId, SettlementId};
use crate::model::WorldGraph;
use crate::model::event::{EventKind, ParticipantRole};
use crate::sim::diplomacy::RelationshipSim;
use crate::sim::strength::{FactionStrength, SettlementStrength};
use crate::sim::war::WarSession;
use crate::territory::{NameGenerator, TerritoryEngine};
use crate::worldgen::config::WorldGenConfig;
use crate::worldgen::generate_world;

/// Build a headless Bevy app with the simulation clock, core resources,
/// message types and the command applicator. Domain systems are added
/// separately via [`SimPlugin`].
///
/// Manual tick control:
/// ```no_run
/// # use dominion_sim::ecs::{build_sim_app, SimTick};
/// # use dominion_sim::ecs::resources::SimConfig;
/// let mut app = build_sim_app(SimConfig::default());
/// for _ in 0..60_000 {  // one day of ticks
///     app.world_mut().run_schedule(SimTick);
/// }
/// ```
///
/// Runs single-threaded so RNG consumption order is identical across runs.
pub fn build_sim_app(config: SimConfig) -> App {
    build_sim_app_with_executor(config, ExecutorKind::SingleThreaded)
}

/// Build a headless Bevy app with a specific executor kind.
pub fn build_sim_app_with_executor(config: SimConfig, executor: ExecutorKind) -> App {
    let mut app = App::empty();

    // Core resources
    app.insert_resource(SimClock::new());
    app.insert_resource(EventLog::new());
    app.insert_resource(SimRng::seeded(config.seed));
    app.insert_resource(WorldMap::default());
    app.insert_resource(SettlementRegistry::new());
    app.insert_resource(FactionManager::new());
    app.insert_resource(TerritoryEngine::from_config(&config));
    app.insert_resource(RelationshipSim::new());
    app.insert_resource(FactionStrength::new());
    app.insert_resource(SettlementStrength::new());
    app.insert_resource(WarSession::new());
    app.insert_resource(config);

    // Per-domain RNG resources (reseeded each tick by distribute_rng)
    app.init_resource::<DiplomacyRng>();
    app.init_resource::<WarRng>();
    app.init_resource::<StrengthRng>();

    // Register message types
    MessageRegistry::register_message::<SimCommand>(app.world_mut());
    MessageRegistry::register_message::<SimReactiveEvent>(app.world_mut());

    // Build schedule with message rotation + applicator + RNG distribution
    let mut schedule = configure_sim_schedule(executor);
    schedule.add_systems(bevy_ecs::message::message_update_system.in_set(SimPhase::PreUpdate));
    schedule.add_systems(distribute_rng.in_set(SimPhase::PreUpdate));
    schedule.add_systems(apply_sim_commands.in_set(SimPhase::PostUpdate));
    app.add_schedule(schedule);
    app
}

/// Generate a fresh world on `graph` and return an app ready to tick.
///
/// Territory is laid out first, then goodwill gets its one-time spread and
/// both strength tables are seeded.
pub fn new_world_app(
    config: SimConfig,
    gen_config: &WorldGenConfig,
    graph: impl WorldGraph + Send + Sync + 'static,
    factions: FactionManager,
    names: &mut dyn NameGenerator,
) -> App {
    let generated = generate_world(
        gen_config,
        TerritoryEngine::from_config(&config),
        &factions,
        &graph,
        names,
    );
    let mut app = build_sim_app(config);
    app.add_plugins(SimPlugin);

    let world = app.world_mut();
    world.insert_resource(WorldMap::new(graph));
    world.insert_resource(factions);
    world.insert_resource(generated.registry);
    world.insert_resource(generated.territory);
    world.insert_resource(generated.log);
    finalize_new_world(world);
    app
}

/// One-time setup for a freshly generated world: initial goodwill offsets,
/// the drift interval, faction strength and per-settlement base strength.
/// Never run this on a loaded world.
pub fn finalize_new_world(world: &mut World) {
    let debug_mode = world.resource::<SimConfig>().debug_mode;
    let Some(mut sim_rng) = world.remove_resource::<SimRng>() else {
        return;
    };
    let rng = &mut sim_rng.rng;
    let mut factions = world.remove_resource::<FactionManager>().unwrap_or_default();
    {
        let mut relationships = world.resource_mut::<RelationshipSim>();
        relationships.apply_initial_offsets(&mut factions, rng);
        relationships.ensure_interval(debug_mode, rng);
    }

    let registry = world.resource::<SettlementRegistry>();
    let mut faction_strength = FactionStrength::new();
    faction_strength.recalculate_all(registry, &factions, rng);
    let mut settlement_strength = SettlementStrength::new();
    settlement_strength.initialize(registry);
    tracing::info!(
        settlements = registry.len(),
        factions = factions.len(),
        "new world finalized"
    );

    world.insert_resource(faction_strength);
    world.insert_resource(settlement_strength);
    world.insert_resource(factions);
    world.insert_resource(sim_rng);
}

/// The player took `settlement` outside the simulation. The capture is applied
/// with the next tick's commands, like any other capture.
///
/// Returns `false` when there is no player faction, the settlement is unknown,
/// or the player already owns it.
pub fn report_player_capture(world: &mut World, settlement: SettlementId) -> bool {
    let Some(player) = world.resource::<FactionManager>().player() else {
        tracing::warn!(settlement = %settlement, "player capture reported without a player faction");
        return false;
    };
    let Some(target) = world.resource::<SettlementRegistry>().get(settlement) else {
        tracing::warn!(settlement = %settlement, "player capture of unknown settlement");
        return false;
    };
    if target.is_owned_by(player) {
        return false;
    }
    let mut cmd = SimCommand::new(
        SimCommandKind::CaptureSettlement {
            settlement,
            new_faction: player,
        },
        EventKind::Conquest,
        format!("{} was taken by the colony", target.name),
    )
    .with_settlement(settlement, ParticipantRole::Defender)
    .with_faction(player, ParticipantRole::Attacker);
    if let Some(previous) = target.faction {
        cmd = cmd.with_faction(previous, ParticipantRole::Defender);
    }
    world.resource_mut::<Messages<SimCommand>>().write(cmd);
    true
}

/// Aggregate strength of `faction`; zero when unknown.
pub fn faction_strength(world: &World, faction: FactionId) -> f64 {
    world.resource::<FactionStrength>().get(faction)
}

/// Current strength of `settlement`, falling back to its tier base.
pub fn settlement_strength(world: &World, settlement: SettlementId) -> Option<f64> {
    let target = world.resource::<SettlementRegistry>().get(settlement)?;
    Some(world.resource::<SettlementStrength>().current(target))
}
