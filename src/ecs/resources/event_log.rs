use bevy_ecs::resource::Resource;

use crate::model::event::{Event, EventKind, Participant, ParticipantRole};

/// Accumulates simulation events for the host to read or persist.
#[derive(Resource, Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<Event>,
    next_id: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its id.
    pub fn record(
        &mut self,
        kind: EventKind,
        tick: u64,
        description: impl Into<String>,
        participants: Vec<(Participant, ParticipantRole)>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.events.push(Event {
            id,
            kind,
            tick,
            description: description.into(),
            participants,
        });
        id
    }

    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Rebuild a log from saved events. New ids continue after the highest one.
    pub fn from_events(events: Vec<Event>) -> Self {
        let next_id = events.iter().map(|e| e.id).max().unwrap_or(0);
        Self { events, next_id }
    }
}
