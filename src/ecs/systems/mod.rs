pub mod diplomacy;
pub mod strength;
pub mod war;
