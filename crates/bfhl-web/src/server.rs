//! Axum server setup and router construction.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::response::Html;
use axum::routing::{get, post, put};
use bfhl_rs::submit::SubmissionController;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::api::{self, AppState};
use crate::broadcast::WsMessage;
use crate::ws::{self, WsState};

/// The single-page form served at `/` when no static directory is set.
const INDEX_HTML: &str = include_str!("../assets/index.html");

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Build the full axum router.
///
/// The router serves:
/// - WebSocket at `/ws`
/// - REST API at `/api/*`
/// - The embedded form at `/`, or the contents of `static_dir` instead
pub fn build_router(
    controller: Arc<SubmissionController>,
    broadcast_tx: broadcast::Sender<WsMessage>,
    static_dir: Option<PathBuf>,
) -> Router {
    let app_state = AppState {
        controller: controller.clone(),
        broadcast_tx: broadcast_tx.clone(),
    };

    let ws_state = WsState {
        controller,
        broadcast_tx,
    };

    // CORS layer for pages served from another origin during development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_upgrade))
        .with_state(ws_state);

    let api_routes = Router::new()
        .route("/api/state", get(api::get_state))
        .route("/api/input", put(api::put_input))
        .route("/api/submit", post(api::post_submit))
        .route("/api/filters/toggle", post(api::post_toggle_filter))
        .route("/api/menu", post(api::post_menu))
        .route("/api/menu/toggle", post(api::post_menu_toggle))
        .with_state(app_state);

    let router = Router::new().merge(ws_routes).merge(api_routes);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.route("/", get(index)),
    };

    router.layer(cors)
}

/// Bind `bind_addr`, start serving on a background task, and return the
/// bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;
    info!("Listening on http://{addr}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("Server error: {e}");
        }
    });

    Ok(addr)
}
