pub mod applicator;
mod apply_territory;

use bevy_ecs::message::Message;

use crate::id::{FactionId, SettlementId};
use crate::model::event::{EventKind, Participant, ParticipantRole};

pub use applicator::apply_sim_commands;

/// A command describing an intended state change in the simulation.
///
/// Systems emit these via `MessageWriter<SimCommand>`. The centralized applicator
/// in `SimPhase::PostUpdate` processes them: applies state changes, records
/// entries in `EventLog`, and emits `SimReactiveEvent` messages.
#[derive(Message, Clone, Debug, PartialEq)]
pub struct SimCommand {
    /// The intent: what state change to apply.
    pub kind: SimCommandKind,
    /// Human-readable description for the EventLog.
    pub description: String,
    /// What EventKind to record in the EventLog.
    pub event_kind: EventKind,
    /// Settlements and factions involved and their roles.
    pub participants: Vec<(Participant, ParticipantRole)>,
}

impl SimCommand {
    pub fn new(kind: SimCommandKind, event_kind: EventKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            event_kind,
            participants: Vec::new(),
        }
    }

    /// A log-only command: records an event, changes nothing.
    pub fn chronicle(event_kind: EventKind, description: impl Into<String>) -> Self {
        Self::new(SimCommandKind::Chronicle, event_kind, description)
    }

    pub fn with_settlement(mut self, settlement: SettlementId, role: ParticipantRole) -> Self {
        self.participants
            .push((Participant::Settlement(settlement), role));
        self
    }

    pub fn with_faction(mut self, faction: FactionId, role: ParticipantRole) -> Self {
        self.participants.push((Participant::Faction(faction), role));
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SimCommandKind {
    /// Move a settlement to another faction. No-op if it already belongs there.
    CaptureSettlement {
        settlement: SettlementId,
        new_faction: FactionId,
    },
    /// Drop a settlement along with its strength entry and anchor.
    ///
    /// Sent by the host when a settlement is destroyed outside the simulation
    /// (razed, abandoned). Generation discards settlements directly and never
    /// uses this.
    RemoveSettlement { settlement: SettlementId },
    /// The world has entered its war situation.
    DeclareWar { a: FactionId, b: FactionId },
    Chronicle,
}
