//! The telemetry tick loop and its stop handle.
//!
//! [`run_generator`] is started once at process startup and runs for the
//! lifetime of the process. Each tick writes the current wave value into
//! both telemetry fields atomically, advances the wave, then sleeps the
//! tick interval. [`GeneratorControl`] provides the graceful-stop signal;
//! the loop observes it between ticks, never mid-write, so the last tick
//! a reader can see is always complete.
//!
//! There is no automatic restart: if the task ends, telemetry freezes at
//! its last written value until the process restarts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use semsim_state::InstrumentStore;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::waveform::TriangleWave;

/// Shared stop handle for the generator loop.
///
/// Wrapped in [`Arc`] and shared between the generator task and whoever
/// owns shutdown (the engine binary, or a test). The flag is checked at
/// the top of every tick; the notify wakes a sleeping generator so a stop
/// does not have to wait out the current interval.
#[derive(Debug, Default)]
pub struct GeneratorControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wakes the generator out of its inter-tick sleep on stop.
    stop_notify: Notify,
}

impl GeneratorControl {
    /// Create a control handle with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a graceful stop. The loop exits before its next write.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_waiters();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Sleep for `interval`, returning early if a stop is requested.
    async fn sleep_tick(&self, interval: Duration) {
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = self.stop_notify.notified() => {}
        }
    }
}

/// Run the telemetry loop until a stop is requested.
///
/// Each iteration writes the current triangle-wave value into `vacuum`
/// and `emission` in one critical section (the lock-step invariant lives
/// in the store), advances the wave, and sleeps `interval`. The stop
/// signal is observed between ticks.
pub async fn run_generator(
    store: Arc<InstrumentStore>,
    control: Arc<GeneratorControl>,
    interval: Duration,
) {
    let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
    info!(interval_ms, "telemetry generator started");

    let mut wave = TriangleWave::new();
    loop {
        if control.is_stop_requested() {
            break;
        }

        let value = wave.value();
        store.set_telemetry(value, value).await;
        debug!(phase = wave.phase(), value, "telemetry tick");
        wave.advance();

        control.sleep_tick(interval).await;
    }

    info!("telemetry generator stopped");
}

/// Spawn the telemetry generator on a background Tokio task.
///
/// Returns a [`JoinHandle`] so the caller can await the loop's exit after
/// calling [`GeneratorControl::request_stop`] during shutdown.
pub fn spawn_generator(
    store: Arc<InstrumentStore>,
    control: Arc<GeneratorControl>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(run_generator(store, control, interval))
}
