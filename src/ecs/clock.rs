use bevy_ecs::resource::Resource;
use bevy_ecs::system::ResMut;

use super::time::SimTime;

/// Simulation clock resource tracking the current time and tick count.
///
/// The `advance_clock` system moves the clock forward at the end of each tick
/// (in `SimPhase::Last`), so systems see the current time before it advances.
#[derive(Resource, Debug, Default)]
pub struct SimClock {
    pub time: SimTime,
    pub tick_count: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a saved tick count.
    pub fn at_tick(tick: u64) -> Self {
        Self {
            time: SimTime::from_ticks(tick),
            tick_count: tick,
        }
    }

    pub fn advance(&mut self) {
        self.time = self.time.advanced(1);
        self.tick_count += 1;
    }
}

/// Bevy system that advances the simulation clock by one tick.
pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.advance();
}
