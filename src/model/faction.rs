use serde::{Deserialize, Serialize};

use crate::id::FactionId;

/// Host-owned faction record. The simulation only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    /// Hidden factions are excluded from every part of the simulation.
    #[serde(default)]
    pub hidden: bool,
    /// The player's faction takes no part in territorial contest or war.
    #[serde(default)]
    pub is_player: bool,
}

impl Faction {
    pub fn new(id: FactionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            hidden: false,
            is_player: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn player(mut self) -> Self {
        self.is_player = true;
        self
    }

    /// Eligible for territorial contest: not hidden and not the player.
    pub fn contests_territory(&self) -> bool {
        !self.hidden && !self.is_player
    }
}
