use serde::{Deserialize, Serialize};

use crate::id::{FactionId, SettlementId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EventKind {
    SettlementFounded,
    SettlementDiscarded,
    FactionReassigned,
    CapitalDemoted,
    WarSituation,
    SiegeLaunched,
    SiegeBegun,
    Conquest,
    SiegeRepelled,
}

string_enum!(EventKind {
    SettlementFounded => "settlement_founded",
    SettlementDiscarded => "settlement_discarded",
    FactionReassigned => "faction_reassigned",
    CapitalDemoted => "capital_demoted",
    WarSituation => "war_situation",
    SiegeLaunched => "siege_launched",
    SiegeBegun => "siege_begun",
    Conquest => "conquest",
    SiegeRepelled => "siege_repelled",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ParticipantRole {
    Subject,
    Object,
    Attacker,
    Defender,
}

string_enum!(ParticipantRole {
    Subject => "subject",
    Object => "object",
    Attacker => "attacker",
    Defender => "defender",
});

/// Something a log entry is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Participant {
    Settlement(SettlementId),
    Faction(FactionId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub kind: EventKind,
    /// Tick the event was recorded on.
    pub tick: u64,
    pub description: String,
    pub participants: Vec<(Participant, ParticipantRole)>,
}
