//! The shared instrument state store.
//!
//! [`InstrumentStore`] owns the current value of every control and
//! telemetry field behind a single [`tokio::sync::RwLock`]. Two kinds of
//! writer share it: the request handlers (many concurrent tasks, each
//! writing one field per command) and the background telemetry generator
//! (one task, writing the vacuum/emission pair once per tick). Readers take
//! consistent snapshots.
//!
//! Holding one lock around every mutation gives the two guarantees the
//! rest of the system relies on:
//!
//! 1. a snapshot never interleaves a partially-written telemetry tick with
//!    other fields (`vacuum` and `emission` move in lock-step), and
//! 2. concurrent single-field writes never lose each other's updates --
//!    each write mutates the live struct in place, never a stale copy.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::controls::{BeamControls, ControlGroup, ImageControls};

/// Upper bound for the telemetry pair. The generator stays inside this by
/// construction; the store clamps anyway so the invariant holds no matter
/// who writes.
const TELEMETRY_MAX: f64 = 100.0;

/// A consistent, point-in-time copy of every instrument field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSnapshot {
    /// Image subsystem controls.
    pub image: ImageControls,
    /// Beam subsystem controls and telemetry.
    pub beam: BeamControls,
}

/// Lock-guarded owner of the instrument state.
///
/// Constructed once at startup with schema defaults; all state is
/// in-memory and resets on process restart.
#[derive(Debug, Default)]
pub struct InstrumentStore {
    inner: RwLock<InstrumentSnapshot>,
}

impl InstrumentStore {
    /// Create a store populated with the schema defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a consistent copy of all fields.
    pub async fn snapshot(&self) -> InstrumentSnapshot {
        self.inner.read().await.clone()
    }

    /// Write `value` into the field named `name` within `group`.
    ///
    /// Returns `true` if the name is in the group's schema and the value
    /// was written verbatim (no clamping), `false` if the name is unknown
    /// and nothing was mutated. The HTTP layer deliberately reports
    /// success either way; the boolean keeps the distinction observable
    /// for tests.
    pub async fn set_field(&self, group: ControlGroup, name: &str, value: f64) -> bool {
        let mut state = self.inner.write().await;
        match group {
            ControlGroup::Image => state.image.set(name, value),
            ControlGroup::Beam => state.beam.set(name, value),
        }
    }

    /// Set the high-voltage setting label verbatim.
    pub async fn set_hv_setting(&self, hv_setting: String) {
        self.inner.write().await.beam.hv_setting = hv_setting;
    }

    /// Set the filament percentage.
    pub async fn set_filament(&self, filament: f64) {
        self.inner.write().await.beam.filament = filament;
    }

    /// Set the bias percentage.
    pub async fn set_bias(&self, bias: f64) {
        self.inner.write().await.beam.bias = bias;
    }

    /// Switch the scintillator high voltage on or off.
    pub async fn set_scintillator_hv(&self, on: bool) {
        self.inner.write().await.beam.scintillator_hv = on;
    }

    /// Set the spot size step.
    ///
    /// Any integer is accepted; the nominal {1,3,5,7,9,11,13,15} set is
    /// not enforced.
    pub async fn set_spot_size(&self, spot_size: i64) {
        self.inner.write().await.beam.spot_size = spot_size;
    }

    /// Reset the accumulated filament time to zero, regardless of its
    /// prior value.
    pub async fn reset_filament_time(&self) {
        self.inner.write().await.beam.filament_time = 0.0;
    }

    /// Write one telemetry tick: both fields in the same critical section,
    /// each clamped to `0..=100`.
    ///
    /// This is the only path that moves the pair together; a concurrent
    /// [`snapshot`](Self::snapshot) sees either the previous tick or this
    /// one, never a mix.
    pub async fn set_telemetry(&self, vacuum: f64, emission: f64) {
        let mut state = self.inner.write().await;
        state.beam.vacuum = vacuum.clamp(0.0, TELEMETRY_MAX);
        state.beam.emission = emission.clamp(0.0, TELEMETRY_MAX);
    }

    /// Current telemetry pair, for the polling endpoint.
    pub async fn telemetry(&self) -> (f64, f64) {
        let state = self.inner.read().await;
        (state.beam.vacuum, state.beam.emission)
    }
}
