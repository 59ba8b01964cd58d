//! Serializable projection of [`FormState`] for WebSocket and REST transport.
//!
//! The browser holds no form logic of its own: the rendered lines, the
//! error banner text and the checkbox catalogue all come precomputed in the
//! snapshot.

use bfhl_rs::ApiResult;
use bfhl_rs::error::ErrorKind;
use bfhl_rs::filter::FilterOption;
use bfhl_rs::form::{FormState, SharedForm, Ticket, lock};
use serde::Serialize;

/// Serializable view of [`FormState`] sent over WebSocket or REST.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormSnapshot {
    // ── Input ──
    pub input: String,

    // ── Outcome ──
    pub result: Option<ApiResult>,
    /// Banner text; `""` when there is no error.
    pub error_message: String,
    pub error_kind: Option<ErrorKind>,

    // ── Filters ──
    /// Selected filters in insertion order (chip order).
    pub selected: Vec<FilterOption>,
    pub menu_open: bool,
    /// One entry per filter in fixed display order (checkbox order).
    pub options: Vec<FilterOptionView>,
    /// Filtered display lines for the current result.
    pub lines: Vec<String>,

    // ── Submission ──
    pub submitting: bool,
    pub in_flight: usize,
    pub latest_ticket: Ticket,
}

/// A checkbox in the filter menu.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterOptionView {
    pub name: FilterOption,
    pub label: &'static str,
    pub checked: bool,
}

impl FormSnapshot {
    /// Build a snapshot from a borrowed form. Call while holding the lock.
    pub fn from_form(state: &FormState) -> Self {
        Self {
            input: state.input.clone(),
            result: state.result.clone(),
            error_message: state.error_message().to_string(),
            error_kind: state.error.as_ref().map(|e| e.kind),
            selected: state.selected.iter().collect(),
            menu_open: state.menu_open,
            options: FilterOption::ALL
                .into_iter()
                .map(|option| FilterOptionView {
                    name: option,
                    label: option.label(),
                    checked: state.selected.contains(option),
                })
                .collect(),
            lines: state.rendered_lines(),
            submitting: state.is_submitting(),
            in_flight: state.in_flight,
            latest_ticket: state.latest_ticket,
        }
    }

    /// Lock the shared form just long enough to snapshot it.
    pub fn capture(state: &SharedForm) -> Self {
        Self::from_form(&lock(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfhl_rs::form::FormError;

    #[test]
    fn snapshot_from_default_state() {
        let snap = FormSnapshot::from_form(&FormState::default());
        assert_eq!(snap.input, "{\n\"data\":[]\n}");
        assert!(snap.result.is_none());
        assert_eq!(snap.error_message, "");
        assert!(snap.error_kind.is_none());
        assert_eq!(
            snap.selected,
            vec![FilterOption::Numbers, FilterOption::HighestLowercaseAlphabet]
        );
        assert!(!snap.menu_open);
        assert!(snap.lines.is_empty());
        assert!(!snap.submitting);
    }

    #[test]
    fn snapshot_serializes_wire_names() {
        let mut form = FormState::default();
        form.toggle_filter(FilterOption::Alphabets);
        form.error = Some(FormError::new(ErrorKind::ResponseShape, "missing numbers"));
        let json = serde_json::to_value(FormSnapshot::from_form(&form)).unwrap();

        assert_eq!(json["selected"][2], "alphabets");
        assert_eq!(json["options"][1]["name"], "highest_lowercase_alphabet");
        assert_eq!(json["options"][1]["label"], "Highest Lowercase Alphabet");
        assert_eq!(json["options"][2]["checked"], true);
        assert_eq!(json["error_kind"], "response_shape");
        assert_eq!(json["error_message"], "Error communicating with the server");
        assert_eq!(json["latest_ticket"], 0);
        assert!(json["result"].is_null());
    }

    #[test]
    fn snapshot_includes_rendered_lines() {
        let mut form = FormState::default();
        let ticket = form.submit_start();
        assert!(form.is_submitting());
        form.submit_succeeded(
            ticket,
            ApiResult {
                numbers: vec!["1".into(), "2".into()],
                alphabets: vec!["A".into(), "B".into()],
                highest_lowercase_alphabet: vec!["z".into()],
            },
        );
        let snap = FormSnapshot::from_form(&form);
        assert_eq!(snap.lines, vec!["Numbers: 1, 2", "Highest Lowercase Alphabet: z"]);
        assert_eq!(snap.latest_ticket, Ticket(1));
        assert!(!snap.submitting);
    }
}
