use bevy_ecs::message::Message;

use crate::id::{FactionId, SettlementId};

/// Reactive events emitted by the command applicator for cross-system reactions.
///
/// Each variant carries an `event_id` linking back to the EventLog entry that
/// caused it. The presentation layer reads `SettlementCaptured` and
/// `SettlementRemoved` to invalidate cached renderings.
#[derive(Message, Clone, Debug, PartialEq)]
pub enum SimReactiveEvent {
    SettlementCaptured {
        event_id: u64,
        settlement: SettlementId,
        old_faction: Option<FactionId>,
        new_faction: FactionId,
    },
    SettlementRemoved {
        event_id: u64,
        settlement: SettlementId,
    },
    WarDeclared {
        event_id: u64,
        a: FactionId,
        b: FactionId,
    },
}
