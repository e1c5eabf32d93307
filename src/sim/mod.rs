//! Pure simulation rules. Systems in `ecs::systems` drive these once per tick.

pub mod diplomacy;
pub mod logistic;
pub mod strength;
pub mod war;
