use serde::{Deserialize, Serialize};

/// Fixed settlement category. Immutable once a settlement exists; a tier change
/// is modelled as remove + re-create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Tier {
    Capital,
    LargeCity,
    SmallCity,
    Village,
}

string_enum!(Tier {
    Capital => "capital",
    LargeCity => "large_city",
    SmallCity => "small_city",
    Village => "village",
});

/// Marker every properly named capital carries.
pub const CAPITAL_MARKER: &str = " (Capital)";

const VILLAGE_SUFFIX: &str = " Village";

/// Name fragments that belong to some tier and must not survive on another.
const TIER_FRAGMENTS: &[&str] = &[CAPITAL_MARKER, " Village", " village", " City", " city"];

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Capital, Tier::LargeCity, Tier::SmallCity, Tier::Village];

    /// Base strength contributed by one settlement of this tier.
    pub fn base_strength(self) -> f64 {
        match self {
            Tier::Capital => 2.5,
            Tier::LargeCity => 2.0,
            Tier::SmallCity => 1.0,
            Tier::Village => 0.7,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Tier::Capital => CAPITAL_MARKER,
            Tier::Village => VILLAGE_SUFFIX,
            Tier::LargeCity | Tier::SmallCity => "",
        }
    }
}

/// Apply the tier naming convention to a generated name.
///
/// Any trailing tier fragment ("City", "Village", the capital marker) is
/// stripped, then the tier's own suffix is appended. Applying it twice gives the
/// same result as applying it once.
pub fn tidy_settlement_name(tier: Tier, raw: &str) -> String {
    let mut base = raw.trim().to_string();
    loop {
        let before = base.len();
        for fragment in TIER_FRAGMENTS {
            if let Some(stripped) = base.strip_suffix(fragment) {
                base = stripped.trim_end().to_string();
            }
        }
        if base.len() == before {
            break;
        }
    }
    if base.is_empty() {
        base = "Nameless".to_string();
    }
    format!("{base}{}", tier.suffix())
}
