use bevy_app::App;

use crate::ecs::clock::SimClock;
use crate::ecs::schedule::SimTick;

/// Run `n` simulation ticks.
pub fn tick_n(app: &mut App, n: u64) {
    for _ in 0..n {
        app.world_mut().run_schedule(SimTick);
    }
}

pub fn current_tick(app: &App) -> u64 {
    app.world().resource::<SimClock>().tick_count
}
