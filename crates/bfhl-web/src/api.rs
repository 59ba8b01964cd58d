//! REST API endpoint handlers.
//!
//! Every form operation is available here with request/response semantics;
//! the WebSocket offers the same operations without waiting for a reply.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bfhl_rs::error::ErrorKind;
use bfhl_rs::filter::FilterOption;
use bfhl_rs::form::{Outcome, lock};
use bfhl_rs::submit::{SubmissionController, SubmitReport};
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::broadcast::{WsMessage, broadcast_snapshot};
use crate::snapshot::FormSnapshot;

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SubmissionController>,
    pub broadcast_tx: broadcast::Sender<WsMessage>,
}

impl AppState {
    /// Broadcast the current form and return the same snapshot.
    fn publish(&self) -> Json<FormSnapshot> {
        broadcast_snapshot(&self.broadcast_tx, self.controller.state());
        Json(FormSnapshot::capture(self.controller.state()))
    }
}

/// GET /api/state: Full form snapshot.
pub async fn get_state(State(app): State<AppState>) -> Json<FormSnapshot> {
    Json(FormSnapshot::capture(app.controller.state()))
}

/// Request body for PUT /api/input.
#[derive(Deserialize)]
pub struct InputRequest {
    pub text: String,
}

/// PUT /api/input: Replace the input buffer. Returns 204.
pub async fn put_input(State(app): State<AppState>, Json(body): Json<InputRequest>) -> StatusCode {
    app.controller.set_input(body.text);
    broadcast_snapshot(&app.broadcast_tx, app.controller.state());
    StatusCode::NO_CONTENT
}

/// Request body for POST /api/submit. The body itself is optional.
#[derive(Deserialize, Default)]
pub struct SubmitRequest {
    /// Replaces the input buffer before submitting.
    #[serde(default)]
    pub text: Option<String>,
}

/// HTTP status for a finished submission.
pub fn submit_status(report: &SubmitReport) -> StatusCode {
    if !report.applied {
        return StatusCode::CONFLICT;
    }
    match &report.outcome {
        Outcome::Succeeded { .. } => StatusCode::OK,
        Outcome::Failed { error } if error.kind == ErrorKind::InvalidInput => {
            StatusCode::BAD_REQUEST
        }
        Outcome::Failed { .. } => StatusCode::BAD_GATEWAY,
    }
}

/// POST /api/submit: Submit the input buffer and wait for the outcome.
///
/// Returns 200 on success, 400 for invalid JSON input, 502 when the
/// endpoint fails, and 409 when a newer submission superseded this one.
/// The body is the outcome in every case.
pub async fn post_submit(State(app): State<AppState>, body: String) -> Response {
    let request = if body.trim().is_empty() {
        SubmitRequest::default()
    } else {
        match serde_json::from_str::<SubmitRequest>(&body) {
            Ok(r) => r,
            Err(e) => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("invalid submit request: {e}"),
                )
                    .into_response();
            }
        }
    };

    if let Some(text) = request.text {
        app.controller.set_input(text);
    }
    let report = app.controller.submit_current().await;
    (submit_status(&report), Json(report)).into_response()
}

/// Request body for POST /api/filters/toggle.
#[derive(Deserialize)]
pub struct ToggleRequest {
    pub filter: FilterOption,
}

/// POST /api/filters/toggle: Flip one filter.
pub async fn post_toggle_filter(
    State(app): State<AppState>,
    Json(body): Json<ToggleRequest>,
) -> Json<FormSnapshot> {
    lock(app.controller.state()).toggle_filter(body.filter);
    app.publish()
}

/// Request body for POST /api/menu.
#[derive(Deserialize)]
pub struct MenuRequest {
    pub open: bool,
}

/// POST /api/menu: Open or close the filter menu.
pub async fn post_menu(
    State(app): State<AppState>,
    Json(body): Json<MenuRequest>,
) -> Json<FormSnapshot> {
    lock(app.controller.state()).set_menu_open(body.open);
    app.publish()
}

/// POST /api/menu/toggle: Flip the filter menu.
pub async fn post_menu_toggle(State(app): State<AppState>) -> Json<FormSnapshot> {
    lock(app.controller.state()).toggle_menu();
    app.publish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfhl_rs::ApiResult;
    use bfhl_rs::form::{FormError, Ticket};

    fn report(outcome: Outcome, applied: bool) -> SubmitReport {
        SubmitReport {
            ticket: Ticket(1),
            outcome,
            applied,
        }
    }

    #[test]
    fn toggle_request_uses_wire_names() {
        let req: ToggleRequest =
            serde_json::from_str(r#"{"filter":"highest_lowercase_alphabet"}"#).unwrap();
        assert_eq!(req.filter, FilterOption::HighestLowercaseAlphabet);
        assert!(serde_json::from_str::<ToggleRequest>(r#"{"filter":"emails"}"#).is_err());
    }

    #[test]
    fn submit_request_text_is_optional() {
        let req: SubmitRequest = serde_json::from_str("{}").unwrap();
        assert!(req.text.is_none());
    }

    #[test]
    fn submit_status_mapping() {
        let ok = Outcome::Succeeded {
            result: ApiResult::default(),
        };
        let invalid = Outcome::Failed {
            error: FormError::new(ErrorKind::InvalidInput, "eof"),
        };
        let comm = Outcome::Failed {
            error: FormError::new(ErrorKind::Communication, "HTTP 500"),
        };
        let shape = Outcome::Failed {
            error: FormError::new(ErrorKind::ResponseShape, "missing"),
        };
        assert_eq!(submit_status(&report(ok.clone(), true)), StatusCode::OK);
        assert_eq!(submit_status(&report(invalid, true)), StatusCode::BAD_REQUEST);
        assert_eq!(submit_status(&report(comm, true)), StatusCode::BAD_GATEWAY);
        assert_eq!(submit_status(&report(shape, true)), StatusCode::BAD_GATEWAY);
        assert_eq!(submit_status(&report(ok, false)), StatusCode::CONFLICT);
    }
}
