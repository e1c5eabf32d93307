use std::collections::BTreeMap;

use super::{TerritoryContext, TerritoryEngine};
use crate::id::{FactionId, SettlementId};
use crate::model::event::{EventKind, Participant, ParticipantRole};
use crate::model::{CAPITAL_MARKER, Settlement, Tier, tidy_settlement_name};

/// A capital demoted to a large city. Tier is immutable, so the city is a new
/// settlement on the same node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapitalDemotion {
    pub removed: SettlementId,
    pub replacement: SettlementId,
    pub faction: FactionId,
}

impl TerritoryEngine {
    /// Found one capital for every faction that contests territory. Factions
    /// that find no open node get none.
    pub fn spawn_capitals(&mut self, ctx: &mut TerritoryContext) -> Vec<SettlementId> {
        let contestants: Vec<FactionId> = ctx.factions.contestants().map(|f| f.id).collect();
        let mut spawned = Vec::with_capacity(contestants.len());
        for faction in contestants {
            let Some(node) = ctx.random_open_node() else {
                tracing::warn!(faction = %faction, "no open node left for a capital");
                continue;
            };
            let id = ctx.found(node, Tier::Capital, Some(faction));
            let name = ctx
                .registry
                .get(id)
                .map(|s| s.name.clone())
                .unwrap_or_default();
            ctx.record(
                EventKind::SettlementFounded,
                format!("{name} was raised as a seat of power"),
                vec![
                    (Participant::Settlement(id), ParticipantRole::Subject),
                    (Participant::Faction(faction), ParticipantRole::Object),
                ],
            );
            spawned.push(id);
        }
        tracing::debug!(capitals = spawned.len(), "capitals spawned");
        spawned
    }

    /// Leave each faction with a single capital.
    ///
    /// The canonical capital is the lowest-id one carrying the capital marker,
    /// or the lowest-id one if none does. Every other capital of that faction is
    /// replaced by a large city on the same node.
    pub fn fix_duplicate_capitals(&mut self, ctx: &mut TerritoryContext) -> Vec<CapitalDemotion> {
        let mut by_faction: BTreeMap<FactionId, Vec<Settlement>> = BTreeMap::new();
        for capital in ctx.registry.all_of_tier(Tier::Capital) {
            if let Some(faction) = capital.faction {
                by_faction.entry(faction).or_default().push(capital.clone());
            }
        }

        let mut demotions = Vec::new();
        for (faction, capitals) in by_faction {
            if capitals.len() < 2 {
                continue;
            }
            let keep = capitals
                .iter()
                .find(|c| c.name.ends_with(CAPITAL_MARKER))
                .unwrap_or(&capitals[0])
                .id;
            for capital in capitals.into_iter().filter(|c| c.id != keep) {
                let replacement = self.demote(ctx, capital, faction);
                demotions.push(replacement);
            }
        }
        demotions
    }

    fn demote(
        &mut self,
        ctx: &mut TerritoryContext,
        capital: Settlement,
        faction: FactionId,
    ) -> CapitalDemotion {
        ctx.registry.remove(capital.id);
        self.forget_anchor(capital.id);
        let name = tidy_settlement_name(Tier::LargeCity, &capital.name);
        let replacement = ctx
            .registry
            .add(name.clone(), capital.node, Tier::LargeCity, Some(faction));
        tracing::debug!(
            capital = %capital.id,
            replacement = %replacement,
            faction = %faction,
            "duplicate capital demoted"
        );
        ctx.record(
            EventKind::CapitalDemoted,
            format!("{} lost its crown and is now the city of {name}", capital.name),
            vec![
                (Participant::Settlement(capital.id), ParticipantRole::Subject),
                (Participant::Settlement(replacement), ParticipantRole::Object),
                (Participant::Faction(faction), ParticipantRole::Defender),
            ],
        );
        CapitalDemotion {
            removed: capital.id,
            replacement,
            faction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::model::{Biome, Faction, TileGraph};
    use crate::territory::test_support::Sandbox;

    #[test]
    fn every_contestant_gets_one_capital() {
        let mut sb = Sandbox::with_graph(TileGraph::grid(20, 20, Biome::Grassland), 1);
        sb.factions.add(Faction::new(FactionId(8), "Veiled").hidden());
        sb.factions.add(Faction::new(FactionId(9), "Colony").player());
        let spawned = TerritoryEngine::new().spawn_capitals(&mut sb.ctx());
        assert_eq!(spawned.len(), 3);
        for faction in [1, 2, 3] {
            let capitals: Vec<_> = sb.registry.owned_by(FactionId(faction)).collect();
            assert_eq!(capitals.len(), 1);
            assert!(capitals[0].is_capital());
            assert!(capitals[0].name.ends_with(CAPITAL_MARKER), "{}", capitals[0].name);
            assert!(!capitals[0].name.contains(" Village"));
        }
        assert_eq!(sb.registry.owned_by(FactionId(8)).count(), 0);
        assert_eq!(sb.registry.owned_by(FactionId(9)).count(), 0);
    }

    #[test]
    fn capitals_avoid_water_and_ice() {
        let mut graph = TileGraph::grid(6, 6, Biome::Ocean);
        graph.set_biome(NodeId(7), Biome::IceSheet);
        graph.set_biome(NodeId(14), Biome::Grassland);
        graph.set_biome(NodeId(21), Biome::Tundra);
        let mut sb = Sandbox::with_graph(graph, 2);
        let spawned = TerritoryEngine::new().spawn_capitals(&mut sb.ctx());
        assert!(spawned.len() <= 2);
        for id in spawned {
            let node = sb.registry.get(id).unwrap().node;
            assert!(node == NodeId(14) || node == NodeId(21), "{node}");
        }
    }

    #[test]
    fn duplicate_capitals_are_demoted_to_large_cities() {
        let mut sb = Sandbox::line(30, 3);
        let canonical = sb
            .registry
            .add("Aster (Capital)", NodeId(2), Tier::Capital, Some(FactionId(1)));
        let stray = sb
            .registry
            .add("Brine", NodeId(9), Tier::Capital, Some(FactionId(1)));
        sb.registry
            .add("Corra (Capital)", NodeId(20), Tier::Capital, Some(FactionId(2)));
        let mut engine = TerritoryEngine::new();
        engine.set_anchor(stray, NodeId(8));

        let demotions = engine.fix_duplicate_capitals(&mut sb.ctx());
        assert_eq!(demotions.len(), 1);
        let demotion = &demotions[0];
        assert_eq!(demotion.removed, stray);
        assert!(!sb.registry.contains(stray));
        assert!(sb.registry.contains(canonical));
        assert_eq!(engine.anchor(stray), None);

        let city = sb.registry.get(demotion.replacement).unwrap();
        assert_eq!(city.tier, Tier::LargeCity);
        assert_eq!(city.node, NodeId(9));
        assert_eq!(city.faction, Some(FactionId(1)));
        assert_eq!(city.name, "Brine");
        assert_eq!(sb.registry.all_of_tier(Tier::Capital).count(), 2);
        assert_eq!(sb.log.of_kind(EventKind::CapitalDemoted).count(), 1);
    }

    #[test]
    fn flipped_capital_is_demoted_not_the_founding_seat() {
        let mut sb = Sandbox::line(60, 5);
        let flipped = sb
            .registry
            .add("Sunton (Capital)", NodeId(10), Tier::Capital, Some(FactionId(1)));
        let seat = sb
            .registry
            .add("Reedford (Capital)", NodeId(12), Tier::Capital, Some(FactionId(2)));
        sb.registry
            .add("Brine", NodeId(14), Tier::SmallCity, Some(FactionId(2)));
        sb.registry
            .add("Corra", NodeId(16), Tier::SmallCity, Some(FactionId(2)));
        let mut engine = TerritoryEngine::new();

        let flips = engine.enforce_local_dominance(&mut sb.ctx());
        assert_eq!(flips, vec![(flipped, FactionId(2))]);
        let taken = sb.registry.get(flipped).unwrap();
        assert!(!taken.name.ends_with(CAPITAL_MARKER), "{}", taken.name);

        let demotions = engine.fix_duplicate_capitals(&mut sb.ctx());
        assert_eq!(demotions.len(), 1);
        assert_eq!(demotions[0].removed, flipped);
        let kept = sb.registry.get(seat).unwrap();
        assert!(kept.is_capital());
        assert_eq!(kept.faction, Some(FactionId(2)));
        let city = sb.registry.get(demotions[0].replacement).unwrap();
        assert_eq!((city.tier, city.node), (Tier::LargeCity, NodeId(10)));
    }

    #[test]
    fn two_marked_capitals_keep_the_lower_id() {
        let mut sb = Sandbox::line(30, 4);
        let first = sb
            .registry
            .add("Aster (Capital)", NodeId(2), Tier::Capital, Some(FactionId(1)));
        sb.registry
            .add("Brine (Capital)", NodeId(9), Tier::Capital, Some(FactionId(1)));
        let demotions = TerritoryEngine::new().fix_duplicate_capitals(&mut sb.ctx());
        assert_eq!(demotions.len(), 1);
        assert!(sb.registry.get(first).unwrap().is_capital());
        let city = sb.registry.get(demotions[0].replacement).unwrap();
        assert_eq!(city.name, "Brine");
    }
}
