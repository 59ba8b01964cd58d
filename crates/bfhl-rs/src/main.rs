//! Submit a JSON document to the bfhl endpoint and print the filtered
//! response.
//!
//! # Examples
//!
//! ```sh
//! # Inline input with the default filters (Numbers, Highest lowercase alphabet)
//! bfhl --input '{"data":["A","C","z","1","334"]}'
//!
//! # Every filter, from a file
//! bfhl --all-filters payload.json
//!
//! # Pipe from stdin, pick filters explicitly
//! cat payload.json | bfhl --stdin --filter alphabets --filter numbers
//!
//! # Point at a local backend and dump the validated result
//! bfhl --endpoint http://localhost:3000/bfhl --raw --input '{"data":[]}'
//! ```

use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use bfhl_rs::config::CONFIG_ENV;
use bfhl_rs::prelude::*;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Submit JSON to the bfhl endpoint and print the selected filters.
///
/// The endpoint comes from --endpoint, then BFHL_ENDPOINT, then the config
/// file, then the built-in default.
#[derive(Parser)]
#[command(name = "bfhl", version)]
struct Cli {
    // ── Input ──────────────────────────────────────────────────
    /// JSON text to submit
    #[arg(long, conflicts_with_all = ["stdin", "file"])]
    input: Option<String>,

    /// Read the JSON text from stdin
    #[arg(long, conflicts_with = "file")]
    stdin: bool,

    /// Read the JSON text from a file
    file: Option<PathBuf>,

    // ── Filters ────────────────────────────────────────────────
    /// Filter to display: numbers, alphabets, highest_lowercase_alphabet.
    /// Repeat to select several.
    #[arg(long = "filter", value_parser = parse_filter, conflicts_with = "all_filters")]
    filters: Vec<FilterOption>,

    /// Display every filter
    #[arg(long)]
    all_filters: bool,

    // ── Endpoint / config ──────────────────────────────────────
    /// URL to POST to
    #[arg(long)]
    endpoint: Option<String>,

    /// Path to a TOML config file (defaults to $BFHL_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    // ── Output mode ────────────────────────────────────────────
    /// Print the validated response as pretty JSON instead of filter lines
    #[arg(long)]
    raw: bool,

    /// Log request details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_filter(s: &str) -> Result<FilterOption, String> {
    s.parse()
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_input(cli: &Cli) -> Result<String, String> {
    if let Some(text) = &cli.input {
        return Ok(text.clone());
    }
    if cli.stdin {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        return Ok(buf);
    }
    if let Some(path) = &cli.file {
        return std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {e}", path.display()));
    }
    Err("provide --input, --stdin, or a file path".to_string())
}

fn selected_filters(cli: &Cli, config: &BfhlConfig) -> SelectedFilters {
    if cli.all_filters {
        SelectedFilters::all()
    } else if !cli.filters.is_empty() {
        SelectedFilters::from_options(cli.filters.iter().copied())
    } else {
        config.selected_filters()
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match BfhlConfig::resolve(cli.config.as_deref(), cli.endpoint.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            if cli.config.is_none() {
                eprintln!("  (config path taken from ${CONFIG_ENV})");
            }
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

    let input = match read_input(&cli) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };

    let state = FormState::new(config.stale_policy, selected_filters(&cli, &config)).shared();
    let controller = SubmissionController::new(client, state.clone());
    debug!("Submitting to {}", controller.client().endpoint());

    let report = controller.submit(&input).await;

    match &report.outcome {
        Outcome::Succeeded { result } if cli.raw => match serde_json::to_string_pretty(result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: failed to serialize result: {e}");
                process::exit(1);
            }
        },
        Outcome::Succeeded { .. } => {
            for line in lock(&state).rendered_lines() {
                println!("{line}");
            }
        }
        Outcome::Failed { error } => {
            eprintln!("{}", error.message);
            debug!("{}", error.detail);
            process::exit(1);
        }
    }
}
