//! Instrument state model and store for the semsim control panel backend.
//!
//! This crate is the single source of truth for the instrument's current
//! configuration. It defines the two control groups (image and beam), the
//! fixed field schema for each, and [`InstrumentStore`], the lock-guarded
//! owner of all field values.
//!
//! # Modules
//!
//! - [`controls`] -- Control group structs, defaults, and the per-group
//!   field-name dispatch tables
//! - [`store`] -- The shared, concurrency-safe [`InstrumentStore`]
//!
//! # Concurrency contract
//!
//! The store is the only resource shared between the request-serving tasks
//! and the background telemetry generator. All access goes through one
//! `RwLock`: a snapshot read can never observe a half-written telemetry
//! tick, and concurrent writes to different fields cannot lose each other's
//! updates. Raw field references are never handed out.

pub mod controls;
pub mod store;

pub use controls::{BeamControls, ControlGroup, ImageControls};
pub use store::{InstrumentSnapshot, InstrumentStore};
