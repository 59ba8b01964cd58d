//! The form's state record and its reducer-style transitions.
//!
//! [`FormState`] holds everything a frontend needs to draw the form: the raw
//! input buffer, the last result or error, the filter selection and the
//! filter menu flag. Every transition is a plain method on the record so it
//! can be exercised without a network or a terminal.
//!
//! # Architecture
//!
//! ```text
//! SubmissionController ──submit_*──▶ Arc<Mutex<FormState>> ◀──reads/toggles── frontend
//! ```
//!
//! Submissions are sequenced with [`Ticket`]s. Whether a completion carrying
//! an older ticket may still overwrite the state is decided by the
//! [`StalePolicy`].

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::ApiResult;
use crate::error::{ErrorKind, SubmitError};
use crate::filter::{self, FilterOption, SelectedFilters};

/// Initial content of the input buffer.
pub const DEFAULT_INPUT: &str = "{\n\"data\":[]\n}";

/// Form state shared between the submission controller and a frontend.
pub type SharedForm = Arc<Mutex<FormState>>;

/// Lock the shared form, recovering the guard if a previous holder panicked.
pub fn lock(state: &SharedForm) -> MutexGuard<'_, FormState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Identity of one submission attempt. Tickets increase monotonically.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Ticket(pub u64);

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What to do with a response that arrives after a newer submission started.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Only the latest ticket may write the result or error.
    #[default]
    DiscardStale,
    /// Whichever response resolves last wins.
    LastWriteWins,
}

/// A failed submission as shown to the user.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FormError {
    pub kind: ErrorKind,
    /// One of the two fixed user-facing messages.
    pub message: String,
    /// Diagnostic detail (not shown in the banner).
    pub detail: String,
}

impl FormError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            message: kind.user_message().to_string(),
            detail: detail.into(),
        }
    }
}

impl From<&SubmitError> for FormError {
    fn from(err: &SubmitError) -> Self {
        FormError::new(err.kind(), err.to_string())
    }
}

/// Terminal result of a single submission.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded { result: ApiResult },
    Failed { error: FormError },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }
}

/// The complete, serializable state of the form.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FormState {
    /// Raw text buffer. Never validated while editing.
    pub input: String,
    /// Last successful result; cleared whenever a submission starts.
    pub result: Option<ApiResult>,
    /// Last failure; cleared whenever a submission starts.
    pub error: Option<FormError>,
    pub selected: SelectedFilters,
    pub menu_open: bool,
    /// Number of submissions started but not yet completed.
    pub in_flight: usize,
    /// Most recently issued ticket (0 before the first submission).
    pub latest_ticket: Ticket,
    pub stale_policy: StalePolicy,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            input: DEFAULT_INPUT.to_string(),
            result: None,
            error: None,
            selected: SelectedFilters::default(),
            menu_open: false,
            in_flight: 0,
            latest_ticket: Ticket(0),
            stale_policy: StalePolicy::default(),
        }
    }
}

impl FormState {
    /// A fresh form with the given policy and initial selection.
    pub fn new(stale_policy: StalePolicy, selected: SelectedFilters) -> Self {
        Self {
            stale_policy,
            selected,
            ..Default::default()
        }
    }

    /// Wrap into the shared handle used by controllers and frontends.
    pub fn shared(self) -> SharedForm {
        Arc::new(Mutex::new(self))
    }

    // ── Filter selection ──

    /// Flip a filter. Returns `true` if it is now selected.
    ///
    /// The menu stays open or closed as it was.
    pub fn toggle_filter(&mut self, option: FilterOption) -> bool {
        self.selected.toggle(option)
    }

    pub fn set_menu_open(&mut self, open: bool) {
        self.menu_open = open;
    }

    /// Flip the filter menu. Returns the new state.
    pub fn toggle_menu(&mut self) -> bool {
        self.menu_open = !self.menu_open;
        self.menu_open
    }

    // ── Input buffer ──

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    // ── Submission lifecycle ──

    /// Begin a submission: clear result and error, issue the next ticket.
    pub fn submit_start(&mut self) -> Ticket {
        self.result = None;
        self.error = None;
        self.latest_ticket = Ticket(self.latest_ticket.0 + 1);
        self.in_flight += 1;
        self.latest_ticket
    }

    /// Whether a completion for `ticket` may write to the state.
    pub fn accepts(&self, ticket: Ticket) -> bool {
        match self.stale_policy {
            StalePolicy::DiscardStale => ticket == self.latest_ticket,
            StalePolicy::LastWriteWins => true,
        }
    }

    fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Store a successful result. Returns `false` if the ticket was stale
    /// and the result was dropped.
    pub fn submit_succeeded(&mut self, ticket: Ticket, result: ApiResult) -> bool {
        self.finish();
        if !self.accepts(ticket) {
            return false;
        }
        self.error = None;
        self.result = Some(result);
        true
    }

    /// Store a failure. Returns `false` if the ticket was stale and the
    /// error was dropped.
    pub fn submit_failed(&mut self, ticket: Ticket, error: FormError) -> bool {
        self.finish();
        if !self.accepts(ticket) {
            return false;
        }
        self.result = None;
        self.error = Some(error);
        true
    }

    /// Apply a finished submission's outcome.
    pub fn complete(&mut self, ticket: Ticket, outcome: &Outcome) -> bool {
        match outcome {
            Outcome::Succeeded { result } => self.submit_succeeded(ticket, result.clone()),
            Outcome::Failed { error } => self.submit_failed(ticket, error.clone()),
        }
    }

    // ── Derived views ──

    /// The error banner text, or `""` when there is none.
    pub fn error_message(&self) -> &str {
        self.error.as_ref().map_or("", |e| e.message.as_str())
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight > 0
    }

    /// Filtered display lines for the current result and selection.
    pub fn rendered_lines(&self) -> Vec<String> {
        filter::render(self.result.as_ref(), &self.selected)
    }
}
