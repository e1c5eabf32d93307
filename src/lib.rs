#[macro_use]
pub mod model;

pub mod ecs;
pub mod id;
pub mod persist;
pub mod sim;
pub mod territory;
pub mod worldgen;

pub use ecs::{SimTick, build_sim_app, new_world_app};
pub use id::{FactionId, IdGenerator, NodeId, SettlementId};
pub use model::{Event, EventKind, Faction, Settlement, Tier, TileGraph, WorldGraph};
