use std::collections::BTreeMap;

use super::{TerritoryContext, TerritoryEngine};
use crate::id::{FactionId, SettlementId};
use crate::model::event::{EventKind, Participant, ParticipantRole};

/// Neighbourhood, in approximate-distance tiles, counted by the dominance pass.
pub const DOMINANCE_RADIUS: f64 = 20.0;

impl TerritoryEngine {
    /// One pass of local dominance over every owned settlement, in id order.
    ///
    /// A settlement flips to a foreign faction only when that faction is the
    /// sole foreign presence in range and outnumbers the settlement's own
    /// faction there. Flips take effect immediately, so later settlements in
    /// the pass see earlier ones. Returns the settlements that changed hands.
    pub fn enforce_local_dominance(
        &mut self,
        ctx: &mut TerritoryContext,
    ) -> Vec<(SettlementId, FactionId)> {
        let mut flipped = Vec::new();
        for id in ctx.registry.ids() {
            let Some(winner) = dominant_foreign_faction(ctx, id) else {
                continue;
            };
            let previous = ctx.registry.get(id).and_then(|s| s.faction);
            ctx.claim(id, winner);
            tracing::debug!(settlement = %id, faction = %winner, "local dominance flip");
            let name = ctx
                .registry
                .get(id)
                .map(|s| s.name.clone())
                .unwrap_or_default();
            let mut participants = vec![
                (Participant::Settlement(id), ParticipantRole::Subject),
                (Participant::Faction(winner), ParticipantRole::Object),
            ];
            if let Some(previous) = previous {
                participants.push((Participant::Faction(previous), ParticipantRole::Defender));
            }
            ctx.record(
                EventKind::FactionReassigned,
                format!("{name} fell under the sway of its neighbours"),
                participants,
            );
            flipped.push((id, winner));
        }
        flipped
    }
}

/// The faction `settlement` should flip to, if any.
fn dominant_foreign_faction(ctx: &TerritoryContext, settlement: SettlementId) -> Option<FactionId> {
    let target = ctx.registry.get(settlement)?;
    let own = target.faction?;
    let mut own_count = 0u32;
    let mut foreign: BTreeMap<FactionId, u32> = BTreeMap::new();
    for other in ctx.registry.owned() {
        if other.id == settlement {
            continue;
        }
        if ctx.graph.approx_distance(target.node, other.node) > DOMINANCE_RADIUS {
            continue;
        }
        match other.faction {
            Some(f) if f == own => own_count += 1,
            Some(f) => *foreign.entry(f).or_insert(0) += 1,
            None => {}
        }
    }
    // More than one foreign faction around is ambiguous; leave it alone.
    let mut foreign = foreign.into_iter();
    let (faction, count) = foreign.next()?;
    if foreign.next().is_some() || count <= own_count {
        return None;
    }
    Some(faction)
}
