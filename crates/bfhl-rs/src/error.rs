//! Error types for submissions and configuration.
//!
//! [`SubmitError`] carries the full diagnostic detail of a failed submission.
//! Users only ever see one of two fixed messages, chosen by
//! [`ErrorKind::user_message`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown when the input buffer is not valid JSON.
pub const INVALID_INPUT_MESSAGE: &str = "Invalid JSON input";

/// Message shown for every network, status, or response-body failure.
pub const COMMUNICATION_MESSAGE: &str = "Error communicating with the server";

/// Coarse classification of a failed submission.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The text buffer did not parse as JSON. No request was sent.
    InvalidInput,
    /// Transport failure, non-2xx status, or a body that is not JSON.
    Communication,
    /// The body was JSON but not the expected result shape.
    ResponseShape,
}

impl ErrorKind {
    /// The fixed message shown to the user for this kind.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => INVALID_INPUT_MESSAGE,
            ErrorKind::Communication | ErrorKind::ResponseShape => COMMUNICATION_MESSAGE,
        }
    }
}

/// Why a submission failed.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("input is not valid JSON: {0}")]
    InvalidInput(#[source] serde_json::Error),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("server returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("response body is not JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("response does not match the expected shape: {}", .violations.join("; "))]
    Shape { violations: Vec<String> },
}

impl SubmitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubmitError::InvalidInput(_) => ErrorKind::InvalidInput,
            SubmitError::Transport(_) | SubmitError::Status { .. } | SubmitError::Decode(_) => {
                ErrorKind::Communication
            }
            SubmitError::Shape { .. } => ErrorKind::ResponseShape,
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}

/// Problems loading or validating [`BfhlConfig`](crate::config::BfhlConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid endpoint '{endpoint}': {reason}")]
    Endpoint { endpoint: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_collapse_to_two() {
        assert_eq!(ErrorKind::InvalidInput.user_message(), "Invalid JSON input");
        assert_eq!(
            ErrorKind::Communication.user_message(),
            "Error communicating with the server"
        );
        assert_eq!(
            ErrorKind::ResponseShape.user_message(),
            ErrorKind::Communication.user_message()
        );
    }

    #[test]
    fn invalid_input_kind() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = SubmitError::InvalidInput(err);
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().starts_with("input is not valid JSON"));
    }

    #[test]
    fn status_is_communication() {
        let err = SubmitError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Communication);
        assert_eq!(err.user_message(), COMMUNICATION_MESSAGE);
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn shape_lists_violations() {
        let err = SubmitError::Shape {
            violations: vec!["/: missing numbers".into(), "/alphabets: not array".into()],
        };
        assert_eq!(err.kind(), ErrorKind::ResponseShape);
        assert!(err.to_string().contains("missing numbers; /alphabets"));
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ResponseShape).unwrap();
        assert_eq!(json, r#""response_shape""#);
    }
}
