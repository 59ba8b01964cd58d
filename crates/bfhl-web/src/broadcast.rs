//! [`EventHandler`] that pushes form snapshots to WebSocket clients.
//!
//! [`WebBroadcastHandler`] listens to the submission lifecycle and sends a
//! fresh [`FormSnapshot`] to every connected client whenever the form
//! changes. Edits made through the REST API or a WebSocket are announced
//! with [`broadcast_snapshot`].

use bfhl_rs::events::{EventHandler, SubmissionEvent};
use bfhl_rs::form::{SharedForm, Ticket};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use crate::snapshot::FormSnapshot;

/// A message sent from the server to WebSocket clients.
///
/// Discriminated on the `type` field when serialized to JSON.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Full form snapshot (on connect and after every change).
    Snapshot { data: FormSnapshot },
    /// A submission's response arrived after a newer one started and was
    /// dropped.
    Discarded { ticket: Ticket, latest: Ticket },
}

/// Snapshot the form and send it to every client.
///
/// Having no subscribers is not an error.
pub fn broadcast_snapshot(sender: &broadcast::Sender<WsMessage>, state: &SharedForm) {
    let data = FormSnapshot::capture(state);
    if sender.send(WsMessage::Snapshot { data }).is_err() {
        trace!("No WebSocket clients connected");
    }
}

/// Event handler that broadcasts form changes to WebSocket clients.
///
/// Compose alongside [`LoggingHandler`](bfhl_rs::events::LoggingHandler) in
/// a [`CompositeEventHandler`](bfhl_rs::events::CompositeEventHandler):
///
/// ```ignore
/// let handler = CompositeEventHandler::new()
///     .with(LoggingHandler)
///     .with(WebBroadcastHandler::new(ws_sender, state.clone()));
/// ```
pub struct WebBroadcastHandler {
    sender: broadcast::Sender<WsMessage>,
    state: SharedForm,
}

impl WebBroadcastHandler {
    pub fn new(sender: broadcast::Sender<WsMessage>, state: SharedForm) -> Self {
        Self { sender, state }
    }
}

impl EventHandler for WebBroadcastHandler {
    fn on_event(&self, event: &SubmissionEvent<'_>) {
        match event {
            // Nothing visible changes between Started and the outcome.
            SubmissionEvent::Sending { .. } => {}
            SubmissionEvent::Discarded { ticket, latest } => {
                let notice = WsMessage::Discarded {
                    ticket: *ticket,
                    latest: *latest,
                };
                if self.sender.send(notice).is_err() {
                    trace!("No WebSocket clients for discard notice {ticket}");
                }
                // In-flight count still dropped.
                broadcast_snapshot(&self.sender, &self.state);
            }
            SubmissionEvent::Started { .. }
            | SubmissionEvent::Succeeded { .. }
            | SubmissionEvent::Failed { .. } => {
                broadcast_snapshot(&self.sender, &self.state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfhl_rs::ApiResult;
    use bfhl_rs::form::{FormState, lock};

    #[test]
    fn ws_message_serializes_with_type_tag() {
        let msg = WsMessage::Discarded {
            ticket: Ticket(1),
            latest: Ticket(2),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "discarded");
        assert_eq!(json["ticket"], 1);
        assert_eq!(json["latest"], 2);
    }

    #[test]
    fn snapshot_message_nests_data() {
        let state = FormState::default().shared();
        let msg = WsMessage::Snapshot {
            data: FormSnapshot::capture(&state),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["data"]["menu_open"], false);
    }

    #[test]
    fn handler_broadcasts_on_lifecycle_changes() {
        let (sender, mut rx) = broadcast::channel(16);
        let state = FormState::default().shared();
        let handler = WebBroadcastHandler::new(sender, state.clone());

        let ticket = lock(&state).submit_start();
        handler.on_event(&SubmissionEvent::Started { ticket });
        match rx.try_recv().unwrap() {
            WsMessage::Snapshot { data } => assert!(data.submitting),
            other => panic!("expected snapshot, got {other:?}"),
        }

        handler.on_event(&SubmissionEvent::Sending {
            ticket,
            endpoint: "http://localhost/bfhl",
            body_bytes: 2,
        });
        assert!(rx.try_recv().is_err(), "sending is not broadcast");

        let result = ApiResult::default();
        lock(&state).submit_succeeded(ticket, result.clone());
        handler.on_event(&SubmissionEvent::Succeeded {
            ticket,
            result: &result,
        });
        match rx.try_recv().unwrap() {
            WsMessage::Snapshot { data } => {
                assert!(!data.submitting);
                assert_eq!(data.result, Some(result));
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn discarded_sends_notice_then_snapshot() {
        let (sender, mut rx) = broadcast::channel(16);
        let state = FormState::default().shared();
        let handler = WebBroadcastHandler::new(sender, state);

        handler.on_event(&SubmissionEvent::Discarded {
            ticket: Ticket(1),
            latest: Ticket(2),
        });
        assert!(matches!(
            rx.try_recv().unwrap(),
            WsMessage::Discarded { .. }
        ));
        assert!(matches!(rx.try_recv().unwrap(), WsMessage::Snapshot { .. }));
    }

    #[test]
    fn broadcast_without_subscribers_is_fine() {
        let (sender, rx) = broadcast::channel::<WsMessage>(4);
        drop(rx);
        broadcast_snapshot(&sender, &FormState::default().shared());
    }

    #[test]
    fn discard_without_subscribers_is_fine() {
        let (sender, rx) = broadcast::channel::<WsMessage>(4);
        drop(rx);
        let handler = WebBroadcastHandler::new(sender.clone(), FormState::default().shared());
        handler.on_event(&SubmissionEvent::Discarded {
            ticket: Ticket(1),
            latest: Ticket(2),
        });

        // A client that connects afterwards still gets later messages.
        let mut rx = sender.subscribe();
        handler.on_event(&SubmissionEvent::Started { ticket: Ticket(3) });
        assert!(matches!(rx.try_recv().unwrap(), WsMessage::Snapshot { .. }));
    }
}
