//! Observer connection registry and broadcast fan-out.
//!
//! Every open `WebSocket` session is represented by an
//! [`ObserverConnection`]: an id plus a bounded send queue draining into
//! that session's writer task. The [`ConnectionRegistry`] owns the set of
//! live connections; [`ConnectionRegistry::broadcast`] delivers a message
//! to all of them, skipping and evicting any connection whose queue is
//! closed or full. Sends never block -- a slow or dead observer cannot
//! stall a control command.

use std::collections::HashMap;

use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};
use uuid::Uuid;

/// Capacity of each connection's send queue.
///
/// A connection that falls this many messages behind is treated as failed
/// and evicted on the next broadcast that cannot enqueue to it.
const SEND_QUEUE_CAPACITY: usize = 64;

/// Prefix a message with the current UTC timestamp.
///
/// Format: `"[YYYY-MM-DD HH:MM:SS] <text>"`. Every broadcast goes through
/// this, whether it originates from a REST control command or from the
/// `WebSocket` echo path.
pub fn stamp(text: &str) -> String {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{timestamp}] {text}")
}

/// One registered observer session.
#[derive(Debug, Clone)]
pub struct ObserverConnection {
    /// Unique connection id, assigned at handshake.
    id: Uuid,
    /// Bounded queue to the session's socket writer task.
    tx: mpsc::Sender<String>,
}

impl ObserverConnection {
    /// Create a connection handle around a send queue.
    pub const fn new(id: Uuid, tx: mpsc::Sender<String>) -> Self {
        Self { id, tx }
    }

    /// Create a connection with a fresh id and queue.
    ///
    /// Returns the handle plus the receiving end for the writer task.
    pub fn channel() -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_CAPACITY);
        (Self::new(Uuid::new_v4(), tx), rx)
    }

    /// This connection's id.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Try to enqueue a message for this connection.
    ///
    /// Returns `false` if the queue is closed (session gone) or full
    /// (session hopelessly behind). Never blocks.
    pub fn send(&self, message: String) -> bool {
        self.tx.try_send(message).is_ok()
    }
}

/// The set of currently open observer connections.
///
/// Supports concurrent register/unregister/broadcast: the map is behind a
/// single `RwLock`, and each broadcast iterates a consistent view taken
/// under the read lock.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<Uuid, ObserverConnection>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection after its handshake completes.
    ///
    /// Ids are v4 uuids assigned at handshake, so re-registering the same
    /// underlying session is not possible; an id collision would replace
    /// the stale entry rather than duplicate it.
    pub async fn register(&self, conn: ObserverConnection) {
        let mut conns = self.connections.write().await;
        let _ = conns.insert(conn.id(), conn);
        debug!(count = conns.len(), "observer registered");
    }

    /// Remove a connection. Idempotent: removing an id that is not
    /// present is a no-op.
    pub async fn unregister(&self, id: Uuid) {
        let mut conns = self.connections.write().await;
        let _ = conns.remove(&id);
        debug!(count = conns.len(), "observer unregistered");
    }

    /// Deliver `message` to every currently registered connection.
    ///
    /// Iterates a stable snapshot of the registry taken at call time; a
    /// connection registering concurrently may or may not see the
    /// message. Failed sends are skipped so the remaining connections
    /// still receive theirs, and the failed connections are evicted
    /// afterwards. The failure is not surfaced to the caller.
    pub async fn broadcast(&self, message: &str) {
        let failed: Vec<Uuid> = {
            let conns = self.connections.read().await;
            debug!(recipients = conns.len(), "broadcast");
            conns
                .values()
                .filter(|conn| !conn.send(message.to_owned()))
                .map(ObserverConnection::id)
                .collect()
        };

        if failed.is_empty() {
            return;
        }

        let mut conns = self.connections.write().await;
        for id in failed {
            warn!(%id, "dropping unreachable observer");
            let _ = conns.remove(&id);
        }
    }

    /// Number of currently registered connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
