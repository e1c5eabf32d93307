//! Pairwise goodwill drift between factions and the global war flag.
//!
//! Goodwill values live in the host's `FactionManager`; this module owns the
//! running offset per pair (sum of every delta it applied), the drift timer and
//! the monotonic war flag.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use bevy_ecs::resource::Resource;
use rand::{Rng, RngCore};

use super::logistic::sigmoid;
use crate::ecs::resources::FactionManager;
use crate::ecs::time::TICKS_PER_DAY;
use crate::id::FactionId;
use crate::model::GoodwillPair;

const INITIAL_OFFSET: RangeInclusive<i32> = -20..=20;
const DRIFT_MAGNITUDE: RangeInclusive<i32> = 1..=6;
const DRIFT_STEEPNESS: f64 = 0.2;
const DRIFT_INTERVAL_DAYS: RangeInclusive<u64> = 10..=20;
const DEBUG_DRIFT_INTERVAL: u64 = 1_000;

/// Goodwill at or below this between any visible pair puts the world at war.
pub const WAR_THRESHOLD: i32 = -80;

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct RelationshipSim {
    /// Ticks between drift passes; 0 until drawn.
    pub drift_interval: u64,
    pub elapsed: u64,
    pub initial_applied: bool,
    /// Once set, never cleared.
    pub war_situation: bool,
    offsets: BTreeMap<GoodwillPair, i32>,
}

/// Every unordered pair of non-hidden, non-player factions, in id order.
fn contestant_pairs(factions: &FactionManager) -> Vec<(FactionId, FactionId)> {
    let ids: Vec<FactionId> = factions.contestants().map(|f| f.id).collect();
    let mut pairs = Vec::with_capacity(ids.len() * ids.len().saturating_sub(1) / 2);
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            pairs.push((a, b));
        }
    }
    pairs
}

impl RelationshipSim {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self, a: FactionId, b: FactionId) -> i32 {
        self.offsets
            .get(&GoodwillPair::of(a, b))
            .copied()
            .unwrap_or(0)
    }

    pub fn offsets(&self) -> impl Iterator<Item = (GoodwillPair, i32)> + '_ {
        self.offsets.iter().map(|(&pair, &offset)| (pair, offset))
    }

    pub fn set_offset(&mut self, pair: GoodwillPair, offset: i32) {
        self.offsets.insert(pair, offset);
    }

    /// Draw the drift interval if it has not been drawn yet.
    pub fn ensure_interval(&mut self, debug_mode: bool, rng: &mut dyn RngCore) {
        if self.drift_interval > 0 {
            return;
        }
        self.drift_interval = if debug_mode {
            DEBUG_DRIFT_INTERVAL
        } else {
            TICKS_PER_DAY * rng.random_range(DRIFT_INTERVAL_DAYS)
        };
    }

    /// One-time random spread of starting goodwill. Fresh worlds only.
    ///
    /// The recorded offset is the delta actually realized after clamping; pairs
    /// whose goodwill did not move get no entry.
    pub fn apply_initial_offsets(&mut self, factions: &mut FactionManager, rng: &mut dyn RngCore) {
        if self.initial_applied {
            return;
        }
        for (a, b) in contestant_pairs(factions) {
            let offset = rng.random_range(INITIAL_OFFSET);
            let realized = factions.adjust_goodwill(a, b, offset);
            if realized != 0 {
                self.offsets.insert(GoodwillPair::of(a, b), realized);
            }
        }
        self.initial_applied = true;
    }

    /// Apply `delta` to a pair's goodwill and fold the realized change into its offset.
    pub fn apply_pair_delta(
        &mut self,
        factions: &mut FactionManager,
        a: FactionId,
        b: FactionId,
        delta: i32,
    ) -> i32 {
        let realized = factions.adjust_goodwill(a, b, delta);
        *self.offsets.entry(GoodwillPair::of(a, b)).or_insert(0) += realized;
        realized
    }

    /// Biased coin flip for one pair: the larger the accumulated offset, the
    /// likelier the pair keeps moving the same way.
    pub fn drift_pair(
        &mut self,
        factions: &mut FactionManager,
        a: FactionId,
        b: FactionId,
        rng: &mut dyn RngCore,
    ) -> i32 {
        let weight = sigmoid(DRIFT_STEEPNESS * self.offset(a, b) as f64);
        let magnitude = rng.random_range(DRIFT_MAGNITUDE);
        let delta = if rng.random::<f64>() < weight {
            magnitude
        } else {
            -magnitude
        };
        self.apply_pair_delta(factions, a, b, delta)
    }

    /// Drift every contestant pair once. Returns the number of pairs visited.
    pub fn drift_all(&mut self, factions: &mut FactionManager, rng: &mut dyn RngCore) -> usize {
        let pairs = contestant_pairs(factions);
        for &(a, b) in &pairs {
            self.drift_pair(factions, a, b, rng);
        }
        pairs.len()
    }

    /// Advance the drift timer by one tick; drifts when the interval elapses.
    pub fn tick(&mut self, factions: &mut FactionManager, rng: &mut dyn RngCore) -> bool {
        self.elapsed += 1;
        if self.elapsed < self.drift_interval {
            return false;
        }
        self.elapsed = 0;
        let visited = self.drift_all(factions, rng);
        tracing::debug!(pairs = visited, "goodwill drift pass");
        true
    }

    /// Raise the war flag if any visible pair is at or below the threshold.
    /// Returns the offending pair only on the tick the flag flips.
    pub fn check_war_situation(&mut self, factions: &FactionManager) -> Option<GoodwillPair> {
        if self.war_situation {
            return None;
        }
        let pair = hostile_pair(factions)?;
        self.war_situation = true;
        Some(pair)
    }
}

/// First non-hidden pair whose goodwill is at or below [`WAR_THRESHOLD`].
pub fn hostile_pair(factions: &FactionManager) -> Option<GoodwillPair> {
    let ids: Vec<FactionId> = factions.visible().map(|f| f.id).collect();
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            if factions.goodwill_between(a, b) <= WAR_THRESHOLD {
                return Some(GoodwillPair::of(a, b));
            }
        }
    }
    None
}
