use serde::{Deserialize, Serialize};

use crate::id::FactionId;

pub const GOODWILL_MIN: i32 = -100;
pub const GOODWILL_MAX: i32 = 100;

/// Unordered faction pair, stored with the smaller id first so `(a, b)` and
/// `(b, a)` address the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GoodwillPair {
    low: FactionId,
    high: FactionId,
}

impl GoodwillPair {
    pub fn of(a: FactionId, b: FactionId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(self) -> FactionId {
        self.low
    }

    pub fn high(self) -> FactionId {
        self.high
    }

    pub fn contains(self, faction: FactionId) -> bool {
        self.low == faction || self.high == faction
    }
}

pub fn clamp_goodwill(value: i32) -> i32 {
    value.clamp(GOODWILL_MIN, GOODWILL_MAX)
}
