//! Background telemetry generator for the semsim control panel backend.
//!
//! One long-lived task drives the beam group's `vacuum` and `emission`
//! readings through a repeating triangle wave, writing both fields into
//! the [`semsim_state::InstrumentStore`] once per tick. This emulates live
//! hardware drift so the panel has something to watch.
//!
//! # Architecture
//!
//! The generator is a pure *writer*: it never broadcasts. Panel clients
//! observe its output by polling `GET /api/beam/status`; the push-based
//! WebSocket fan-out carries only control-command notifications. That
//! split is deliberate and load-bearing -- do not wire the generator into
//! the broadcast path.
//!
//! # Modules
//!
//! - [`waveform`] -- the pure triangle wave
//! - [`generator`] -- the tick loop, its stop handle, and the task spawner

pub mod generator;
pub mod waveform;

pub use generator::{GeneratorControl, run_generator, spawn_generator};
pub use waveform::TriangleWave;
