use bevy_ecs::world::World;

use crate::ecs::events::SimReactiveEvent;
use crate::ecs::resources::{FactionManager, SettlementRegistry};
use crate::id::{FactionId, SettlementId};
use crate::sim::strength::SettlementStrength;
use crate::territory::TerritoryEngine;

use super::SimCommand;
use super::applicator::ApplyCtx;

/// Hand a settlement to `new_faction`. Strength carries over unchanged.
///
/// Only the player can take a settlement back from the player; a siege that
/// resolves in the same tick as a player capture loses.
pub(crate) fn apply_capture_settlement(
    ctx: &mut ApplyCtx,
    world: &mut World,
    cmd: &SimCommand,
    settlement: SettlementId,
    new_faction: FactionId,
) {
    let player = world.resource::<FactionManager>().player();
    let mut registry = world.resource_mut::<SettlementRegistry>();
    let Some(current) = registry.get(settlement) else {
        tracing::warn!(settlement = %settlement, "capture of unknown settlement ignored");
        return;
    };
    if current.is_owned_by(new_faction) {
        return;
    }
    if player.is_some_and(|player| current.is_owned_by(player)) {
        tracing::debug!(settlement = %settlement, faction = %new_faction, "capture of a player settlement ignored");
        return;
    }
    let old_faction = registry.set_faction(settlement, new_faction).flatten();

    let event_id = ctx.record_event(cmd);
    ctx.emit(SimReactiveEvent::SettlementCaptured {
        event_id,
        settlement,
        old_faction,
        new_faction,
    });
}

pub(crate) fn apply_remove_settlement(
    ctx: &mut ApplyCtx,
    world: &mut World,
    cmd: &SimCommand,
    settlement: SettlementId,
) {
    if world
        .resource_mut::<SettlementRegistry>()
        .remove(settlement)
        .is_none()
    {
        return;
    }
    world.resource_mut::<SettlementStrength>().forget(settlement);
    world
        .resource_mut::<TerritoryEngine>()
        .forget_anchor(settlement);

    let event_id = ctx.record_event(cmd);
    ctx.emit(SimReactiveEvent::SettlementRemoved {
        event_id,
        settlement,
    });
}
