//! Interactive terminal form.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p bfhl-tui
//! cargo run -p bfhl-tui -- --endpoint http://localhost:3000/bfhl
//! BFHL_CONFIG=bfhl.toml cargo run -p bfhl-tui -- -v
//! ```
//!
//! Edit the JSON, press Ctrl+S to submit, then Tab over to the filter menu
//! and chips. Logs are captured into a pane (Ctrl+L) instead of stdout.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use bfhl_rs::prelude::*;
use bfhl_tui::{TuiConfig, spawn_tui};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Terminal form for the bfhl endpoint.
#[derive(Parser)]
#[command(name = "bfhl-tui", version)]
struct Args {
    /// URL to POST to
    #[arg(long)]
    endpoint: Option<String>,

    /// Path to a TOML config file (defaults to $BFHL_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Capture debug-level logs in the log pane
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

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

    // Tracing goes to the TUI log buffer, never to the terminal.
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let (tracing_layer, log_buffer) = UiTracingLayer::new();
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_layer)
        .init();

    let state = config.initial_form_state().shared();
    let controller = Arc::new(SubmissionController::new(client, state));

    let tui_config = TuiConfig {
        log_buffer: Some(log_buffer),
        ..Default::default()
    };
    let handle = spawn_tui(controller, tokio::runtime::Handle::current(), tui_config);

    let joined = tokio::task::spawn_blocking(move || handle.join()).await;
    if !matches!(joined, Ok(Ok(()))) {
        eprintln!("Error: TUI thread panicked");
        process::exit(1);
    }
}
