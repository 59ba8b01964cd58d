//! Browser form for `bfhl-rs`.
//!
//! `bfhl-web` serves a single HTML page plus a REST API and a WebSocket over
//! the shared [`FormState`](bfhl_rs::form::FormState). The page is a thin
//! view: it sends edits, toggles and submits to the server and draws the
//! [`FormSnapshot`]s it gets back. Filtering and error mapping happen in
//! `bfhl-rs`, exactly as for the CLI and the TUI.
//!
//! # Quick start
//!
//! ```ignore
//! use bfhl_rs::prelude::*;
//! use bfhl_web::{WebBroadcastHandler, WebConfig, WsMessage, spawn_web};
//! use std::sync::Arc;
//!
//! let config = BfhlConfig::resolve(None, None)?;
//! let state = config.initial_form_state().shared();
//! let (ws_tx, _) = tokio::sync::broadcast::channel::<WsMessage>(256);
//!
//! let controller = SubmissionController::new(BfhlClient::new(&config)?, state.clone())
//!     .with_event_handler(WebBroadcastHandler::new(ws_tx.clone(), state));
//!
//! let addr = spawn_web(Arc::new(controller), ws_tx, WebConfig::default()).await?;
//! println!("Form: http://{addr}");
//! ```
//!
//! # Architecture
//!
//! ```text
//! SubmissionController ──SubmissionEvent──▶ WebBroadcastHandler ──WsMessage──▶ WebSocket clients
//!         │                                                                          │
//!         └── Arc<Mutex<FormState>> ◀── /api/*, WebSocket messages ◀─────────────────┘
//! ```

mod api;
pub mod broadcast;
mod server;
pub mod snapshot;
mod ws;

pub use broadcast::{WebBroadcastHandler, WsMessage, broadcast_snapshot};
pub use snapshot::{FilterOptionView, FormSnapshot};

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use bfhl_rs::submit::SubmissionController;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:3001`.
    pub bind_addr: SocketAddr,
    /// Directory served instead of the embedded page.
    pub static_dir: Option<PathBuf>,
    /// WebSocket broadcast channel capacity. Default: 256.
    ///
    /// Clients that fall behind by this many messages receive a fresh
    /// snapshot to resynchronize.
    pub broadcast_capacity: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            static_dir: None,
            broadcast_capacity: 256,
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
///
/// # Arguments
///
/// * `controller`: Drives submissions against the shared form. Give it a
///   [`WebBroadcastHandler`] on the same `broadcast_tx` so clients see
///   submission progress.
/// * `broadcast_tx`: Sender half of the WebSocket broadcast channel.
/// * `config`: Server configuration.
pub async fn spawn_web(
    controller: Arc<SubmissionController>,
    broadcast_tx: tokio::sync::broadcast::Sender<WsMessage>,
    config: WebConfig,
) -> io::Result<SocketAddr> {
    let router = server::build_router(controller, broadcast_tx, config.static_dir);
    server::start_server(router, config.bind_addr).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_config_default() {
        let config = WebConfig::default();
        assert_eq!(config.bind_addr.port(), 3001);
        assert!(config.bind_addr.ip().is_loopback());
        assert!(config.static_dir.is_none());
        assert_eq!(config.broadcast_capacity, 256);
    }
}
