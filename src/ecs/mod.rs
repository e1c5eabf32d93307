pub mod app;
pub mod clock;
pub mod commands;
pub mod conditions;
pub mod events;
pub mod plugin;
pub mod resources;
pub mod schedule;
pub mod systems;
#[cfg(test)]
pub(crate) mod test_helpers;
pub mod time;

pub use app::{
    build_sim_app, build_sim_app_with_executor, faction_strength, finalize_new_world,
    new_world_app, report_player_capture, settlement_strength,
};
pub use clock::SimClock;
pub use commands::{SimCommand, SimCommandKind};
pub use conditions::war_declared;
pub use events::SimReactiveEvent;
pub use plugin::SimPlugin;
pub use resources::{EventLog, FactionManager, SettlementRegistry, SimConfig, SimRng, WorldMap};
pub use schedule::{DomainSet, SimPhase, SimTick, configure_sim_schedule};
pub use time::SimTime;
