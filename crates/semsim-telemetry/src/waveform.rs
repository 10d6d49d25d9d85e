//! The telemetry triangle wave.
//!
//! The wave ramps linearly from 0 to 100 over ticks 0..=100, then back
//! down from 100 to 0 over ticks 101..=201, repeating forever. One full
//! cycle is 202 ticks; at the default 50 ms tick interval that is one
//! cycle every ~10.1 s. The phase counter is the single source of truth --
//! the value is always derived from it, never stored independently.

/// Number of discrete ticks in one full cycle (up ramp plus down ramp).
pub const PERIOD_TICKS: u16 = 202;

/// Phase index of the last tick in a cycle.
const LAST_TICK: u16 = 201;

/// Phase index at which the wave reaches its peak on the way up.
const PEAK_TICK: u16 = 100;

/// A triangle wave over the telemetry range `0..=100`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriangleWave {
    /// Phase within the current cycle, always `< PERIOD_TICKS`.
    phase: u16,
}

impl TriangleWave {
    /// Create a wave at phase 0 (value 0, about to ramp up).
    pub const fn new() -> Self {
        Self { phase: 0 }
    }

    /// Value for the current phase, in `0..=100`.
    pub fn value(&self) -> f64 {
        let level = if self.phase <= PEAK_TICK {
            self.phase
        } else {
            LAST_TICK.saturating_sub(self.phase)
        };
        f64::from(level)
    }

    /// Advance to the next tick, wrapping at the end of the cycle.
    pub fn advance(&mut self) {
        self.phase = match self.phase.checked_add(1) {
            Some(next) if next < PERIOD_TICKS => next,
            _ => 0,
        };
    }

    /// Current phase within the cycle.
    pub const fn phase(&self) -> u16 {
        self.phase
    }
}
