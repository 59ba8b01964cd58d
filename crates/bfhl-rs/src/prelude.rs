//! Convenience re-exports for common `bfhl-rs` types.
//!
//! Meant to be glob-imported by frontends:
//!
//! ```ignore
//! use bfhl_rs::prelude::*;
//! ```
//!
//! Schema helpers and the message constants stay in their modules.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{ApiResult, BfhlClient};

// ── Configuration ───────────────────────────────────────────────────
pub use crate::config::BfhlConfig;

// ── Errors ──────────────────────────────────────────────────────────
pub use crate::error::{ConfigError, ErrorKind, SubmitError};

// ── Form state ──────────────────────────────────────────────────────
pub use crate::filter::{FilterOption, SelectedFilters, render};
pub use crate::form::{FormError, FormState, Outcome, SharedForm, StalePolicy, Ticket, lock};

// ── Submission ──────────────────────────────────────────────────────
pub use crate::events::{
    CompositeEventHandler, EventHandler, FnEventHandler, LoggingHandler, SubmissionEvent,
};
pub use crate::submit::{SubmissionController, SubmitReport};

// ── Log capture ─────────────────────────────────────────────────────
pub use crate::ui::tracing::{LogBuffer, UiTracingLayer};
pub use crate::ui::{LogLevel, LogLine};
