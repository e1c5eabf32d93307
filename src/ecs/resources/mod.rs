pub mod event_log;
pub mod factions;
pub mod registry;
pub mod sim_resources;
pub mod world_map;

pub use event_log::EventLog;
pub use factions::FactionManager;
pub use registry::SettlementRegistry;
pub use sim_resources::{DiplomacyRng, SimConfig, SimRng, StrengthRng, WarRng, distribute_rng};
pub use world_map::WorldMap;
