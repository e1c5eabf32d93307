use serde::{Deserialize, Serialize};

use super::tier::Tier;
use crate::id::{FactionId, NodeId, SettlementId};

/// A settlement on the world graph.
///
/// `faction` is only `None` transiently, between placement and faction
/// assignment. Settlements that end up unowned are removed from the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub name: String,
    pub node: NodeId,
    pub tier: Tier,
    pub faction: Option<FactionId>,
}

impl Settlement {
    pub fn is_capital(&self) -> bool {
        self.tier == Tier::Capital
    }

    pub fn is_owned_by(&self, faction: FactionId) -> bool {
        self.faction == Some(faction)
    }
}
