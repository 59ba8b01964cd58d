//! Lifecycle events emitted by the [`SubmissionController`](crate::submit::SubmissionController).
//!
//! Frontends implement [`EventHandler`] to react to submissions: the web
//! server pushes a fresh snapshot to its clients, the CLI only logs.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures |
//! | [`CompositeEventHandler`] | Compose several handlers in order |

use tracing::{debug, info, warn};

use crate::ApiResult;
use crate::error::SubmitError;
use crate::form::Ticket;

/// Events emitted during a submission.
#[derive(Debug)]
pub enum SubmissionEvent<'a> {
    /// Result and error were cleared and a ticket issued.
    Started { ticket: Ticket },
    /// The input parsed and a request is about to be sent.
    Sending {
        ticket: Ticket,
        endpoint: &'a str,
        body_bytes: usize,
    },
    /// The submission succeeded and its result was stored.
    Succeeded {
        ticket: Ticket,
        result: &'a ApiResult,
    },
    /// The submission failed and its error was stored.
    Failed {
        ticket: Ticket,
        error: &'a SubmitError,
    },
    /// A newer submission had started, so this one's outcome was dropped.
    Discarded { ticket: Ticket, latest: Ticket },
}

/// Observer for [`SubmissionEvent`]s.
///
/// Handlers run synchronously on the submitting task and must not block.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &SubmissionEvent<'_>) {
        let _ = event;
    }
}

/// A handler backed by a closure.
///
/// ```ignore
/// let handler = FnEventHandler::new(|event| {
///     if let SubmissionEvent::Succeeded { result, .. } = event {
///         println!("{} numbers", result.numbers.len());
///     }
/// });
/// ```
pub struct FnEventHandler<F>(F)
where
    F: Fn(&SubmissionEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&SubmissionEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&SubmissionEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &SubmissionEvent<'_>) {
        (self.0)(event)
    }
}

/// Dispatches each event to every inner handler in registration order.
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Add a handler to the chain.
    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Add a handler only when `condition` holds.
    pub fn with_if(self, condition: bool, handler: impl EventHandler + 'static) -> Self {
        if condition { self.with(handler) } else { self }
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &SubmissionEvent<'_>) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}

/// Logs events via `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &SubmissionEvent<'_>) {
        match event {
            SubmissionEvent::Started { ticket } => {
                debug!("Submission {ticket} started");
            }
            SubmissionEvent::Sending {
                ticket,
                endpoint,
                body_bytes,
            } => {
                debug!("Submission {ticket}: POST {endpoint} ({body_bytes} bytes)");
            }
            SubmissionEvent::Succeeded { ticket, result } => {
                info!(
                    "Submission {ticket} succeeded: {} numbers, {} alphabets",
                    result.numbers.len(),
                    result.alphabets.len()
                );
            }
            SubmissionEvent::Failed { ticket, error } => {
                warn!("Submission {ticket} failed ({:?}): {error}", error.kind());
            }
            SubmissionEvent::Discarded { ticket, latest } => {
                info!("Submission {ticket} superseded by {latest}; outcome dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn composite_calls_every_handler_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let a = seen.clone();
        let b = seen.clone();
        let skipped = seen.clone();
        let handler = CompositeEventHandler::new()
            .with(FnEventHandler::new(move |_| a.lock().unwrap().push("a")))
            .with_if(
                false,
                FnEventHandler::new(move |_| skipped.lock().unwrap().push("skipped")),
            )
            .with(FnEventHandler::new(move |_| b.lock().unwrap().push("b")));

        handler.on_event(&SubmissionEvent::Started { ticket: Ticket(1) });
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn logging_handler_accepts_every_variant() {
        let result = ApiResult::default();
        let error = SubmitError::Shape {
            violations: vec!["/: bad".into()],
        };
        let events = [
            SubmissionEvent::Started { ticket: Ticket(1) },
            SubmissionEvent::Sending {
                ticket: Ticket(1),
                endpoint: "http://localhost/bfhl",
                body_bytes: 11,
            },
            SubmissionEvent::Succeeded {
                ticket: Ticket(1),
                result: &result,
            },
            SubmissionEvent::Failed {
                ticket: Ticket(2),
                error: &error,
            },
            SubmissionEvent::Discarded {
                ticket: Ticket(1),
                latest: Ticket(2),
            },
        ];
        for event in &events {
            LoggingHandler.on_event(event);
        }
    }
}
