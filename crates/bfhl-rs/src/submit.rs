//! The submission lifecycle.
//!
//! A submission clears the previous result and error, parses the raw text,
//! POSTs the re-serialized value, and stores whatever comes back. The state
//! lock is taken only around each reducer call and is never held across the
//! network round-trip, so frontends stay responsive while a request is
//! outstanding.

use serde::{Deserialize, Serialize};

use crate::error::SubmitError;
use crate::events::{EventHandler, LoggingHandler, SubmissionEvent};
use crate::form::{FormError, Outcome, SharedForm, Ticket, lock};
use crate::{ApiResult, BfhlClient};

/// Parse the input buffer as JSON.
///
/// Nesting depth is unbounded: the parser grows its stack on the heap
/// instead of stopping at serde_json's default limit of 128.
pub fn parse_input(raw: &str) -> Result<serde_json::Value, SubmitError> {
    let mut de = serde_json::Deserializer::from_str(raw);
    de.disable_recursion_limit();
    let value = serde_json::Value::deserialize(serde_stacker::Deserializer::new(&mut de))
        .map_err(SubmitError::InvalidInput)?;
    // Reject trailing characters, as `serde_json::from_str` does.
    de.end().map_err(SubmitError::InvalidInput)?;
    Ok(value)
}

/// What happened to one call of [`SubmissionController::submit`].
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SubmitReport {
    pub ticket: Ticket,
    #[serde(flatten)]
    pub outcome: Outcome,
    /// `false` when a newer submission had started and this outcome was
    /// not written to the form.
    pub applied: bool,
}

/// Drives submissions against a shared [`FormState`](crate::form::FormState).
pub struct SubmissionController {
    client: BfhlClient,
    state: SharedForm,
    handler: Box<dyn EventHandler>,
}

impl SubmissionController {
    /// Create a controller that logs lifecycle events via `tracing`.
    pub fn new(client: BfhlClient, state: SharedForm) -> Self {
        Self {
            client,
            state,
            handler: Box::new(LoggingHandler),
        }
    }

    /// Replace the event handler.
    pub fn with_event_handler(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handler = Box::new(handler);
        self
    }

    pub fn state(&self) -> &SharedForm {
        &self.state
    }

    pub fn client(&self) -> &BfhlClient {
        &self.client
    }

    /// Replace the input buffer.
    pub fn set_input(&self, text: impl Into<String>) {
        lock(&self.state).set_input(text);
    }

    /// Submit whatever is currently in the input buffer.
    pub async fn submit_current(&self) -> SubmitReport {
        let raw = lock(&self.state).input.clone();
        self.submit(&raw).await
    }

    /// Submit `raw` and store the outcome in the form.
    ///
    /// Always resolves; failures are reported in the returned
    /// [`Outcome`] and in the form's error field.
    pub async fn submit(&self, raw: &str) -> SubmitReport {
        let ticket = lock(&self.state).submit_start();
        self.handler.on_event(&SubmissionEvent::Started { ticket });

        let result = self.exchange(ticket, raw).await;
        self.finish(ticket, result)
    }

    async fn exchange(&self, ticket: Ticket, raw: &str) -> Result<ApiResult, SubmitError> {
        let parsed = parse_input(raw)?;
        // Compact re-serialization, not the raw text.
        let payload = parsed.to_string();
        self.handler.on_event(&SubmissionEvent::Sending {
            ticket,
            endpoint: self.client.endpoint(),
            body_bytes: payload.len(),
        });
        self.client.post(payload).await
    }

    fn finish(&self, ticket: Ticket, result: Result<ApiResult, SubmitError>) -> SubmitReport {
        let outcome = match &result {
            Ok(r) => Outcome::Succeeded { result: r.clone() },
            Err(e) => Outcome::Failed {
                error: FormError::from(e),
            },
        };

        let (applied, latest) = {
            let mut state = lock(&self.state);
            let applied = state.complete(ticket, &outcome);
            (applied, state.latest_ticket)
        };

        let event = match (&result, applied) {
            (_, false) => SubmissionEvent::Discarded { ticket, latest },
            (Ok(r), true) => SubmissionEvent::Succeeded { ticket, result: r },
            (Err(e), true) => SubmissionEvent::Failed { ticket, error: e },
        };
        self.handler.on_event(&event);

        SubmitReport {
            ticket,
            outcome,
            applied,
        }
    }
}
