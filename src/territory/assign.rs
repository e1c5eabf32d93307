use rand::seq::IndexedRandom;

use super::{TerritoryContext, TerritoryEngine};
use crate::id::{FactionId, NodeId, SettlementId};
use crate::model::{Settlement, Tier};

/// Traversal distances closer than this count as a tie.
const TIE_EPSILON: f64 = 1e-6;

impl TerritoryEngine {
    /// Pick a faction for `settlement` with a freshly drawn capital radius.
    ///
    /// Returns the assigned faction, or `None` after removing the settlement
    /// from the registry because nobody could claim it.
    pub fn assign_faction(
        &mut self,
        ctx: &mut TerritoryContext,
        settlement: SettlementId,
    ) -> Option<FactionId> {
        let radius = self.draw_radius(&mut *ctx.rng);
        self.assign_faction_within(ctx, settlement, radius)
    }

    /// [`assign_faction`](Self::assign_faction) with a fixed capital radius.
    pub fn assign_faction_within(
        &mut self,
        ctx: &mut TerritoryContext,
        settlement: SettlementId,
        radius: f64,
    ) -> Option<FactionId> {
        let target = ctx.registry.get(settlement)?.clone();
        let capitals: Vec<Settlement> = ctx
            .registry
            .all_of_tier(Tier::Capital)
            .filter(|c| c.id != settlement && c.faction.is_some())
            .cloned()
            .collect();
        let in_range: Vec<&Settlement> = capitals
            .iter()
            .filter(|c| ctx.graph.approx_distance(target.node, c.node) <= radius)
            .collect();

        let chosen = match in_range.as_slice() {
            [only] => only.faction,
            [] => nearest_claimed_neighbour(ctx, &target, &capitals, radius),
            several => self.closest_capital_faction(ctx, target.node, several),
        };

        match chosen {
            Some(faction) => {
                tracing::debug!(
                    settlement = %settlement,
                    faction = %faction,
                    capitals_in_range = in_range.len(),
                    "faction assigned"
                );
                ctx.claim(settlement, faction);
                Some(faction)
            }
            None => {
                ctx.discard(settlement);
                None
            }
        }
    }

    /// Faction whose capital anchor is the shortest walk from `node`. Ties are
    /// broken at random; unreachable anchors are skipped.
    fn closest_capital_faction(
        &mut self,
        ctx: &mut TerritoryContext,
        node: NodeId,
        capitals: &[&Settlement],
    ) -> Option<FactionId> {
        let mut best = f64::INFINITY;
        let mut tied: Vec<FactionId> = Vec::new();
        for capital in capitals {
            let Some(faction) = capital.faction else {
                continue;
            };
            let anchor = self.anchor_for(capital, ctx.graph, &mut *ctx.rng);
            let Some(distance) = ctx.graph.traversal_distance(node, anchor) else {
                continue;
            };
            if (distance - best).abs() <= TIE_EPSILON {
                if !tied.contains(&faction) {
                    tied.push(faction);
                }
            } else if distance < best {
                best = distance;
                tied.clear();
                tied.push(faction);
            }
        }
        match tied.as_slice() {
            [] => None,
            [only] => Some(*only),
            _ => tied.choose(&mut *ctx.rng).copied(),
        }
    }
}

/// Owned non-capital settlement inside some capital's radius that lies
/// closest to `target`. Capitals themselves do not lend their faction here.
fn nearest_claimed_neighbour(
    ctx: &TerritoryContext,
    target: &Settlement,
    capitals: &[Settlement],
    radius: f64,
) -> Option<FactionId> {
    ctx.registry
        .owned()
        .filter(|s| s.id != target.id && !s.is_capital())
        .filter(|s| {
            capitals
                .iter()
                .any(|c| ctx.graph.approx_distance(s.node, c.node) <= radius)
        })
        .map(|s| (ctx.graph.approx_distance(target.node, s.node), s))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .and_then(|(_, s)| s.faction)
}
