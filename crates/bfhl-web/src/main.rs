//! Browser form server.
//!
//! Serves the form page, a REST API and a WebSocket. All form state lives
//! in this process; every connected browser sees the same form.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p bfhl-web
//! cargo run -p bfhl-web -- --port 8080
//! cargo run -p bfhl-web -- --endpoint http://localhost:3000/bfhl
//! cargo run -p bfhl-web -- --static-dir ./public
//! ```
//!
//! Then open the printed URL in a browser (or use curl / wscat).
//!
//! ## Driving the form without a browser
//!
//! **REST** (`POST /api/submit`):
//! ```json
//! {"text": "{\"data\":[\"A\",\"1\",\"z\"]}"}
//! ```
//!
//! **WebSocket** (connect to `/ws`):
//! ```json
//! {"type": "toggle_filter", "filter": "alphabets"}
//! ```

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use bfhl_rs::prelude::*;
use bfhl_web::{WebBroadcastHandler, WebConfig, WsMessage, spawn_web};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Browser form for the bfhl endpoint.
#[derive(Parser)]
#[command(name = "bfhl-web", version)]
struct Args {
    /// Port for the web server.
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Listen on all interfaces instead of localhost only.
    #[arg(long)]
    public: bool,

    /// Serve this directory instead of the built-in page.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// URL to POST to.
    #[arg(long)]
    endpoint: Option<String>,

    /// Path to a TOML config file (defaults to $BFHL_CONFIG).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,

    /// Don't log submission lifecycle events.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 1. Resolve configuration and build the HTTP client.
    let config = match BfhlConfig::resolve(args.config.as_deref(), args.endpoint) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };
    let client = match BfhlClient::new(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };

    // 2. Shared form state and WebSocket broadcast channel.
    let web_config = WebConfig {
        bind_addr: if args.public {
            ([0, 0, 0, 0], args.port).into()
        } else {
            ([127, 0, 0, 1], args.port).into()
        },
        static_dir: args.static_dir,
        ..Default::default()
    };
    let state = config.initial_form_state().shared();
    let (ws_tx, _) = tokio::sync::broadcast::channel::<WsMessage>(web_config.broadcast_capacity);

    // 3. Push every change to the browsers, and log lifecycle events.
    let handler = CompositeEventHandler::new()
        .with(WebBroadcastHandler::new(ws_tx.clone(), state.clone()))
        .with_if(!args.quiet, LoggingHandler);
    let controller = Arc::new(SubmissionController::new(client, state).with_event_handler(handler));
    info!("Submitting to {}", controller.client().endpoint());

    // 4. Serve until interrupted.
    let addr = match spawn_web(controller, ws_tx, web_config).await {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Error: failed to start server: {e}");
            process::exit(1);
        }
    };
    println!("Form: http://{addr}");

    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("Error: failed to listen for Ctrl+C: {e}");
        process::exit(1);
    }
    info!("Shutting down");
}
