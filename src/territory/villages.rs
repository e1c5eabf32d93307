use super::{TerritoryContext, TerritoryEngine};
use crate::id::{FactionId, NodeId, SettlementId};
use crate::model::Tier;

impl TerritoryEngine {
    /// Scatter villages around the existing settlements.
    ///
    /// Aims for `per_settlement` villages per settlement present at the start,
    /// giving up after `2 × node_count` draws. Each village joins the faction
    /// of the nearest owned settlement, villages placed earlier included.
    pub fn spawn_villages(
        &mut self,
        ctx: &mut TerritoryContext,
        per_settlement: usize,
    ) -> Vec<SettlementId> {
        let target = ctx.registry.len() * per_settlement;
        let mut spawned = Vec::with_capacity(target);
        let mut attempts = ctx.graph.node_count() * 2;
        while spawned.len() < target && attempts > 0 {
            attempts -= 1;
            let Some(node) = ctx.graph.random_node(&mut *ctx.rng) else {
                break;
            };
            if !ctx.is_open(node) {
                continue;
            }
            let Some(faction) = nearest_owner(ctx, node) else {
                continue;
            };
            spawned.push(ctx.found(node, Tier::Village, Some(faction)));
        }
        tracing::debug!(villages = spawned.len(), target, "villages spawned");
        spawned
    }
}

fn nearest_owner(ctx: &TerritoryContext, node: NodeId) -> Option<FactionId> {
    ctx.registry
        .owned()
        .map(|s| (ctx.graph.approx_distance(node, s.node), s))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .and_then(|(_, s)| s.faction)
}
