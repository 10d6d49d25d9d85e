//! `WebSocket` endpoint: observer sessions and the echo-broadcast path.
//!
//! Clients connect to `GET /ws`. Every inbound text frame from any client
//! is broadcast to **all** registered connections (sender included),
//! wrapped with a timestamp prefix. REST-triggered broadcasts share the
//! same registry, so one socket sees both streams.
//!
//! Session lifecycle: `Connecting` (upgrade in flight) -> `Open`
//! (registered) -> `Closed` (terminal). Entering `Open` registers the
//! connection; leaving it -- close frame, read error, or stream end --
//! unregisters exactly once, on the single exit path of the read loop.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::debug;

use crate::registry::{ObserverConnection, stamp};
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` observer session.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Run one observer session from registration through disconnect.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sink, mut stream) = socket.split();

    let (conn, mut rx) = ObserverConnection::channel();
    let id = conn.id();
    state.registry.register(conn).await;
    debug!(%id, "websocket observer connected");

    // Writer task: drain this session's queue into the socket. Ends when
    // the queue closes (unregistered) or the peer stops accepting.
    let writer = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Read loop: echo every text frame to the whole registry.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                state.registry.broadcast(&stamp(text.as_str())).await;
            }
            Ok(Message::Close(_)) => {
                debug!(%id, "websocket observer sent close frame");
                break;
            }
            Ok(_) => {
                // Binary, ping, pong: ignored. Axum answers pings itself.
            }
            Err(e) => {
                debug!(%id, error = %e, "websocket read error");
                break;
            }
        }
    }

    // Single exit point: leaving Open unregisters exactly once.
    state.registry.unregister(id).await;
    writer.abort();
    debug!(%id, "websocket observer disconnected");
}
