use bevy_ecs::system::Res;

use crate::sim::diplomacy::RelationshipSim;

fn war_declared_check(relationships: &RelationshipSim) -> bool {
    relationships.war_situation
}

/// Run condition gating the war state machine (for use with `.run_if()`).
pub fn war_declared(relationships: Res<RelationshipSim>) -> bool {
    war_declared_check(&relationships)
}
