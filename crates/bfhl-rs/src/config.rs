//! Runtime configuration with layered overrides.
//!
//! Values are resolved in this order, later layers winning:
//!
//! 1. Built-in defaults ([`BfhlConfig::default`]).
//! 2. A TOML file given explicitly or via `BFHL_CONFIG`.
//! 3. The `BFHL_ENDPOINT` environment variable.
//! 4. The `--endpoint` flag, passed to [`BfhlConfig::resolve`].
//!
//! ```toml
//! endpoint = "https://bfhl-backend-wheat.vercel.app/bfhl"
//! stale_policy = "discard_stale"
//! default_filters = ["numbers", "highest_lowercase_alphabet"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::filter::{FilterOption, SelectedFilters};
use crate::form::{FormState, StalePolicy};
use crate::{DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "BFHL_CONFIG";
/// Environment variable overriding the endpoint URL.
pub const ENDPOINT_ENV: &str = "BFHL_ENDPOINT";

/// Settings shared by every frontend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BfhlConfig {
    /// URL the input is POSTed to.
    pub endpoint: String,
    /// Handling of responses that arrive after a newer submission started.
    pub stale_policy: StalePolicy,
    /// `User-Agent` header sent with each request.
    pub user_agent: String,
    /// Filters selected when the form opens.
    pub default_filters: Vec<FilterOption>,
}

impl Default for BfhlConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            stale_policy: StalePolicy::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_filters: SelectedFilters::default().iter().collect(),
        }
    }
}

impl BfhlConfig {
    /// Parse a TOML document. `origin` names the source in error messages.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Load a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
        debug!("Loaded config from {shown} ({} bytes)", text.len());
        Self::from_toml_str(&text, &shown)
    }

    /// Resolve defaults, the config file, environment overrides and the
    /// `--endpoint` flag, then validate the result.
    pub fn resolve(path: Option<&Path>, endpoint: Option<String>) -> Result<Self, ConfigError> {
        Self::resolve_with(path, endpoint, |key| std::env::var(key).ok())
    }

    /// [`resolve`](Self::resolve) with an injectable environment lookup.
    pub fn resolve_with(
        path: Option<&Path>,
        endpoint: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => match env(CONFIG_ENV) {
                Some(p) if !p.trim().is_empty() => Self::load(Path::new(p.trim()))?,
                _ => Self::default(),
            },
        };
        config.apply_env(&env);
        let config = config.with_endpoint(endpoint);
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides.
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = env(ENDPOINT_ENV).filter(|e| !e.trim().is_empty()) {
            debug!("Endpoint overridden by {ENDPOINT_ENV}");
            self.endpoint = endpoint.trim().to_string();
        }
    }

    /// Check that the endpoint is an absolute `http`/`https` URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.endpoint).map_err(|e| ConfigError::Endpoint {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::Endpoint {
                endpoint: self.endpoint.clone(),
                reason: format!("unsupported scheme '{other}'"),
            }),
        }
    }

    /// Builder-style endpoint override, used for CLI flags.
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        self
    }

    pub fn selected_filters(&self) -> SelectedFilters {
        SelectedFilters::from_options(self.default_filters.iter().copied())
    }

    /// A fresh form honouring this config's policy and default filters.
    pub fn initial_form_state(&self) -> FormState {
        FormState::new(self.stale_policy, self.selected_filters())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_point_at_reference_deployment() {
        let config = BfhlConfig::default();
        assert_eq!(config.endpoint, "https://bfhl-backend-wheat.vercel.app/bfhl");
        assert_eq!(config.stale_policy, StalePolicy::DiscardStale);
        assert_eq!(config.selected_filters(), SelectedFilters::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_partial_toml() {
        let config = BfhlConfig::from_toml_str(
            r#"
endpoint = "http://localhost:8080/bfhl"
stale_policy = "last_write_wins"
"#,
            "inline",
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:8080/bfhl");
        assert_eq!(config.stale_policy, StalePolicy::LastWriteWins);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = BfhlConfig::from_toml_str("retries = 3", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn default_filters_become_initial_selection() {
        let config =
            BfhlConfig::from_toml_str(r#"default_filters = ["alphabets", "alphabets"]"#, "inline")
                .unwrap();
        let state = config.initial_form_state();
        let selected: Vec<_> = state.selected.iter().collect();
        assert_eq!(selected, vec![FilterOption::Alphabets]);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"endpoint = "https://example.com/bfhl""#).unwrap();
        let config = BfhlConfig::resolve_with(Some(file.path()), None, no_env).unwrap();
        assert_eq!(config.endpoint, "https://example.com/bfhl");
    }

    #[test]
    fn config_env_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"endpoint = "https://from-file.example/bfhl""#).unwrap();
        let path = file.path().display().to_string();
        let config = BfhlConfig::resolve_with(None, None, |key| {
            (key == CONFIG_ENV).then(|| path.clone())
        })
        .unwrap();
        assert_eq!(config.endpoint, "https://from-file.example/bfhl");
    }

    #[test]
    fn endpoint_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"endpoint = "https://from-file.example/bfhl""#).unwrap();
        let config = BfhlConfig::resolve_with(Some(file.path()), None, |key| {
            (key == ENDPOINT_ENV).then(|| "http://127.0.0.1:9/bfhl".to_string())
        })
        .unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:9/bfhl");
    }

    #[test]
    fn endpoint_flag_overrides_bad_env() {
        let bad_env = |key: &str| (key == ENDPOINT_ENV).then(|| "not a url".to_string());

        let config =
            BfhlConfig::resolve_with(None, Some("http://127.0.0.1:9/bfhl".into()), bad_env)
                .unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:9/bfhl");

        let err = BfhlConfig::resolve_with(None, None, bad_env).unwrap_err();
        assert!(matches!(err, ConfigError::Endpoint { .. }));
    }

    #[test]
    fn endpoint_flag_overrides_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"endpoint = "ftp://from-file.example/bfhl""#).unwrap();
        let config = BfhlConfig::resolve_with(
            Some(file.path()),
            Some("https://flag.example/bfhl".into()),
            no_env,
        )
        .unwrap();
        assert_eq!(config.endpoint, "https://flag.example/bfhl");
    }

    #[test]
    fn bad_endpoint_flag_is_rejected() {
        let err = BfhlConfig::resolve_with(None, Some("mailto:someone".into()), no_env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Endpoint { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = BfhlConfig::resolve_with(Some(Path::new("/nonexistent/bfhl.toml")), None, no_env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let config = BfhlConfig::default().with_endpoint(Some("ftp://example.com".into()));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Endpoint { .. })
        ));
        let config = BfhlConfig::default().with_endpoint(Some("not a url".into()));
        assert!(config.validate().is_err());
    }
}
