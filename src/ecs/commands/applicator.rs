use bevy_ecs::message::Messages;
use bevy_ecs::world::World;

use crate::ecs::clock::SimClock;
use crate::ecs::events::SimReactiveEvent;
use crate::ecs::resources::EventLog;

use super::apply_territory;
use super::{SimCommand, SimCommandKind};

/// Context passed to all `apply_*` sub-functions.
pub(crate) struct ApplyCtx {
    pub event_log: EventLog,
    pub tick: u64,
    pub reactive_events: Vec<SimReactiveEvent>,
}

impl ApplyCtx {
    /// Record the command's EventLog entry and return its id.
    pub(crate) fn record_event(&mut self, cmd: &SimCommand) -> u64 {
        self.event_log.record(
            cmd.event_kind,
            self.tick,
            cmd.description.clone(),
            cmd.participants.clone(),
        )
    }

    /// Queue a reactive event for emission after all commands are processed.
    pub(crate) fn emit(&mut self, event: SimReactiveEvent) {
        self.reactive_events.push(event);
    }
}

/// Exclusive system that drains all pending `SimCommand` messages, applies
/// state changes, records them in the `EventLog`, and emits `SimReactiveEvent`
/// messages.
///
/// Runs in `SimPhase::PostUpdate`.
pub fn apply_sim_commands(world: &mut World) {
    let commands: Vec<SimCommand> = {
        let Some(mut messages) = world.get_resource_mut::<Messages<SimCommand>>() else {
            return;
        };
        messages.drain().collect()
    };

    if commands.is_empty() {
        return;
    }

    let tick = world
        .get_resource::<SimClock>()
        .map(|clock| clock.tick_count)
        .unwrap_or_default();
    let event_log = world.remove_resource::<EventLog>().unwrap_or_default();
    let mut ctx = ApplyCtx {
        event_log,
        tick,
        reactive_events: Vec::new(),
    };

    for cmd in &commands {
        match &cmd.kind {
            SimCommandKind::CaptureSettlement {
                settlement,
                new_faction,
            } => {
                apply_territory::apply_capture_settlement(
                    &mut ctx,
                    world,
                    cmd,
                    *settlement,
                    *new_faction,
                );
            }
            SimCommandKind::RemoveSettlement { settlement } => {
                apply_territory::apply_remove_settlement(&mut ctx, world, cmd, *settlement);
            }
            SimCommandKind::DeclareWar { a, b } => {
                let event_id = ctx.record_event(cmd);
                ctx.emit(SimReactiveEvent::WarDeclared {
                    event_id,
                    a: *a,
                    b: *b,
                });
            }
            SimCommandKind::Chronicle => {
                ctx.record_event(cmd);
            }
        }
    }

    let reactive_events = std::mem::take(&mut ctx.reactive_events);
    if let Some(mut messages) = world.get_resource_mut::<Messages<SimReactiveEvent>>() {
        messages.write_batch(reactive_events);
    }

    world.insert_resource(ctx.event_log);
}
