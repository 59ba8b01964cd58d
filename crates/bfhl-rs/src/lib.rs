//! Core of the bfhl form: submit JSON to a remote endpoint and render a
//! filtered view of the response.
//!
//! The crate is UI-agnostic. Frontends (the `bfhl` CLI, `bfhl-tui`,
//! `bfhl-web`) share the same pieces:
//!
//! - [`form::FormState`]: the explicit, serializable state record with
//!   reducer-style transitions (`toggle_filter`, `set_menu_open`,
//!   `submit_start`, `submit_succeeded`, `submit_failed`).
//! - [`filter`]: the fixed [`FilterOption`](filter::FilterOption) set, the
//!   insertion-ordered [`SelectedFilters`](filter::SelectedFilters), and the
//!   pure [`render`](filter::render) derivation.
//! - [`submit::SubmissionController`]: parse → POST → decode → store, with
//!   ticket sequencing so stale responses cannot overwrite newer ones.
//! - [`BfhlClient`]: the single HTTP call.
//! - [`config::BfhlConfig`]: endpoint and policy, layered from TOML, env and
//!   flags.
//! - [`events`]: lifecycle hooks.
//! - [`ui::tracing`]: a log capture layer for terminal frontends.
//!
//! # Example
//!
//! ```ignore
//! use bfhl_rs::prelude::*;
//!
//! let config = BfhlConfig::resolve(None, None)?;
//! let state = config.initial_form_state().shared();
//! let controller = SubmissionController::new(BfhlClient::new(&config)?, state.clone());
//!
//! let report = controller.submit(r#"{"data":["A","1","z"]}"#).await;
//! for line in lock(&state).rendered_lines() {
//!     println!("{line}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod form;
pub mod prelude;
pub mod schema;
pub mod submit;
pub mod ui;

use std::time::Instant;

use reqwest::header::CONTENT_TYPE;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::BfhlConfig;
use crate::error::{ConfigError, SubmitError};

// ── Constants ──────────────────────────────────────────────────────

/// Endpoint of the reference deployment.
pub const DEFAULT_ENDPOINT: &str = "https://bfhl-backend-wheat.vercel.app/bfhl";

pub const DEFAULT_USER_AGENT: &str = concat!("bfhl-rs/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error response body kept for diagnostics.
const MAX_ERROR_BODY_CHARS: usize = 512;

// ── Response types ─────────────────────────────────────────────────

/// The part of the endpoint's success response the form displays.
///
/// Other fields in the response body are ignored.
#[derive(Serialize, Deserialize, JsonSchema, Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiResult {
    pub numbers: Vec<String>,
    pub alphabets: Vec<String>,
    /// Single element in practice.
    pub highest_lowercase_alphabet: Vec<String>,
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the bfhl endpoint.
#[derive(Clone)]
pub struct BfhlClient {
    client: reqwest::Client,
    endpoint: String,
}

impl BfhlClient {
    /// Build a client for the configured endpoint.
    ///
    /// No request timeout is set: a hung request keeps its submission
    /// pending without blocking anything else.
    pub fn new(config: &BfhlConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ConfigError::Client)?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST a pre-serialized JSON body and decode the result.
    pub async fn post(&self, payload: String) -> Result<ApiResult, SubmitError> {
        trace!("Request payload: {payload}");
        let start = Instant::now();

        let resp = self
            .client
            .post(self.endpoint.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(SubmitError::Transport)?;

        let status = resp.status();
        let text = resp.text().await.map_err(SubmitError::Transport)?;

        debug!(
            "Response: HTTP {} in {:.2}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(SubmitError::Status {
                status,
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let value: serde_json::Value = serde_json::from_str(&text).map_err(SubmitError::Decode)?;
        schema::decode_result(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_result_ignores_extra_fields() {
        let json = r#"{
            "is_success": true,
            "email": "john@xyz.com",
            "numbers": ["1"],
            "alphabets": ["B"],
            "highest_lowercase_alphabet": []
        }"#;
        let result: ApiResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.numbers, vec!["1"]);
        assert!(result.highest_lowercase_alphabet.is_empty());
    }

    #[test]
    fn client_rejects_invalid_endpoint() {
        let config = BfhlConfig::default().with_endpoint(Some("mailto:someone".into()));
        assert!(matches!(
            BfhlClient::new(&config),
            Err(ConfigError::Endpoint { .. })
        ));
    }

    #[test]
    fn client_keeps_endpoint() {
        let config = BfhlConfig::default().with_endpoint(Some("http://127.0.0.1:1/bfhl".into()));
        let client = BfhlClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:1/bfhl");
    }

    #[test]
    fn user_agent_carries_version() {
        assert!(DEFAULT_USER_AGENT.starts_with("bfhl-rs/"));
    }
}
