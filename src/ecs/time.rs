use std::fmt;

// Calendar constants. One tick is the smallest unit of simulated time.
pub const TICKS_PER_HOUR: u64 = 2_500;
pub const HOURS_PER_DAY: u64 = 24;
pub const DAYS_PER_QUADRUM: u64 = 15;
pub const QUADRUMS_PER_YEAR: u64 = 4;
pub const DAYS_PER_YEAR: u64 = DAYS_PER_QUADRUM * QUADRUMS_PER_YEAR; // 60

pub const TICKS_PER_DAY: u64 = TICKS_PER_HOUR * HOURS_PER_DAY; // 60,000
pub const TICKS_PER_QUADRUM: u64 = TICKS_PER_DAY * DAYS_PER_QUADRUM; // 900,000
pub const TICKS_PER_YEAR: u64 = TICKS_PER_DAY * DAYS_PER_YEAR; // 3,600,000

/// Simulation time as total elapsed ticks since the world began.
///
/// Calendar accessors are derived by division/modulo.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(u64);

impl SimTime {
    pub fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    pub fn as_ticks(self) -> u64 {
        self.0
    }

    pub fn year(self) -> u64 {
        self.0 / TICKS_PER_YEAR
    }

    /// Quadrum of the year (1–4).
    pub fn quadrum(self) -> u64 {
        (self.0 % TICKS_PER_YEAR) / TICKS_PER_QUADRUM + 1
    }

    /// Day within the quadrum (1–15).
    pub fn day_of_quadrum(self) -> u64 {
        (self.0 % TICKS_PER_QUADRUM) / TICKS_PER_DAY + 1
    }

    /// Hour of day (0–23).
    pub fn hour(self) -> u64 {
        (self.0 % TICKS_PER_DAY) / TICKS_PER_HOUR
    }

    pub fn advanced(self, ticks: u64) -> Self {
        Self(self.0 + ticks)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Y{} Q{} D{} {:02}h",
            self.year(),
            self.quadrum(),
            self.day_of_quadrum(),
            self.hour()
        )
    }
}
