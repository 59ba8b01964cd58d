//! WebSocket upgrade handler and message dispatch.
//!
//! Each connected client receives:
//! 1. A full [`FormSnapshot`] on connect.
//! 2. A new snapshot after every change, whichever client caused it.
//!
//! Clients drive the form by sending JSON messages back.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use bfhl_rs::filter::FilterOption;
use bfhl_rs::form::lock;
use bfhl_rs::submit::SubmissionController;
use futures::{SinkExt, StreamExt, stream::SplitSink};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::broadcast::{WsMessage, broadcast_snapshot};
use crate::snapshot::FormSnapshot;

/// Shared state for WebSocket handlers.
#[derive(Clone)]
pub struct WsState {
    pub controller: Arc<SubmissionController>,
    pub broadcast_tx: broadcast::Sender<WsMessage>,
}

/// A message received from a WebSocket client.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ClientMessage {
    SetInput {
        text: String,
    },
    /// Submit the buffer, optionally replacing it first.
    Submit {
        #[serde(default)]
        text: Option<String>,
    },
    ToggleFilter {
        filter: FilterOption,
    },
    SetMenuOpen {
        open: bool,
    },
    ToggleMenu,
}

/// GET /ws: WebSocket upgrade handler.
pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(ws_state): State<WsState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, ws_state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, ws_state: WsState) {
    let (mut sink, mut stream) = socket.split();

    // Subscribe before snapshotting so no change slips in between.
    let mut broadcast_rx = ws_state.broadcast_tx.subscribe();

    let snapshot_msg = WsMessage::Snapshot {
        data: FormSnapshot::capture(ws_state.controller.state()),
    };
    if ws_send(&mut sink, &snapshot_msg).await.is_err() {
        return;
    }

    debug!("WebSocket client connected");

    // Forward broadcast messages to this client.
    let state_for_resync = ws_state.controller.state().clone();
    let forward_task = tokio::spawn(async move {
        loop {
            match broadcast_rx.recv().await {
                Ok(msg) => {
                    if ws_send(&mut sink, &msg).await.is_err() {
                        break; // Client disconnected.
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("WebSocket client lagged by {n} messages, resending snapshot");
                    let msg = WsMessage::Snapshot {
                        data: FormSnapshot::capture(&state_for_resync),
                    };
                    if ws_send(&mut sink, &msg).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => handle_client_message(msg, &ws_state),
                Err(e) => debug!("Ignoring malformed WebSocket message: {e}"),
            },
            Message::Close(_) => break,
            _ => {} // Ignore binary, ping, pong.
        }
    }

    debug!("WebSocket client disconnected");
    forward_task.abort();
}

/// Apply a client message to the form.
///
/// Submissions run on their own task; their snapshots are broadcast by the
/// controller's event handler as the lifecycle progresses.
pub(crate) fn handle_client_message(msg: ClientMessage, ws_state: &WsState) {
    let state = ws_state.controller.state();
    match msg {
        ClientMessage::SetInput { text } => {
            lock(state).set_input(text);
        }
        ClientMessage::Submit { text } => {
            if let Some(text) = text {
                lock(state).set_input(text);
            }
            let controller = ws_state.controller.clone();
            tokio::spawn(async move {
                controller.submit_current().await;
            });
            return;
        }
        ClientMessage::ToggleFilter { filter } => {
            lock(state).toggle_filter(filter);
        }
        ClientMessage::SetMenuOpen { open } => {
            lock(state).set_menu_open(open);
        }
        ClientMessage::ToggleMenu => {
            lock(state).toggle_menu();
        }
    }
    broadcast_snapshot(&ws_state.broadcast_tx, state);
}

/// Serialize a `WsMessage` and send it over the WebSocket sink.
async fn ws_send(sink: &mut SplitSink<WebSocket, Message>, msg: &WsMessage) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
