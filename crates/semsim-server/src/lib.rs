//! Control panel API server for the semsim instrument backend.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) where every inbound text message is
//!   echoed to all connected observers with a timestamp prefix
//! - **REST control endpoints** (`POST /api/image/...`, `POST /api/beam/...`)
//!   that write into the shared [`semsim_state::InstrumentStore`] and
//!   notify observers through the same broadcast fan-out
//! - **Query endpoints**: the full snapshot (`GET /api/state`) and the
//!   telemetry pair for polling (`GET /api/beam/status`)
//! - **Minimal HTML status page** (`GET /`) listing the endpoints
//!
//! # Architecture
//!
//! Control commands and the `WebSocket` echo path are the only broadcast
//! sources; the background telemetry generator writes the store but never
//! broadcasts, so observers poll `GET /api/beam/status` for readings.
//! Both broadcast sources share one [`ConnectionRegistry`]: a send failure
//! on one connection schedules its removal and never blocks delivery to
//! the rest.
//!
//! [`ConnectionRegistry`]: registry::ConnectionRegistry

pub mod handlers;
pub mod registry;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use registry::ConnectionRegistry;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
