//! Shared application state for the control panel API server.
//!
//! [`AppState`] bundles the two resources every handler needs: the
//! instrument store (the single owner of all field values) and the
//! observer connection registry (the single owner of the connection set).
//! Neither owns the other. Wrapped in [`Arc`] and injected via Axum's
//! `State` extractor.

use std::sync::Arc;

use semsim_state::InstrumentStore;

use crate::registry::ConnectionRegistry;

/// Shared state for the Axum application.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The instrument state store, shared with the telemetry generator.
    pub store: Arc<InstrumentStore>,
    /// The observer connection registry used by both broadcast sources.
    pub registry: Arc<ConnectionRegistry>,
}

impl AppState {
    /// Create an application state with a fresh default store and an
    /// empty registry.
    pub fn new() -> Self {
        Self::with_store(Arc::new(InstrumentStore::new()))
    }

    /// Create an application state around an existing store.
    ///
    /// The engine binary uses this so the same store instance can be
    /// shared with the telemetry generator task.
    pub fn with_store(store: Arc<InstrumentStore>) -> Self {
        Self {
            store,
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
