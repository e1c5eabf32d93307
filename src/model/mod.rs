#[macro_use]
mod macros;

pub mod event;
pub mod faction;
pub mod goodwill;
pub mod graph;
pub mod settlement;
pub mod tier;

pub use event::{Event, EventKind, Participant, ParticipantRole};
pub use faction::Faction;
pub use goodwill::{GOODWILL_MAX, GOODWILL_MIN, GoodwillPair, clamp_goodwill};
pub use graph::{Biome, TileGraph, WorldGraph};
pub use settlement::Settlement;
pub use tier::{CAPITAL_MARKER, Tier, tidy_settlement_name};
