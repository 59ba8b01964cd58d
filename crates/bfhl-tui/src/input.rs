//! Key handling for the form.
//!
//! Form mutations go through the [`FormState`](bfhl_rs::form::FormState)
//! reducers. Submitting needs the async runtime, so it is returned as an
//! [`Action`] for the event loop to run.

use bfhl_rs::filter::FilterOption;
use bfhl_rs::form::{SharedForm, lock};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{self, Action, App, Focus};

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App, state: &SharedForm) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global bindings, available from every focus.
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
            app.should_quit = true;
            return None;
        }
        KeyCode::Char('s') if ctrl => return Some(Action::Submit),
        KeyCode::F(5) => return Some(Action::Submit),
        KeyCode::Char('l') if ctrl => {
            app.show_logs = !app.show_logs;
            return None;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            let (has_result, chips) = {
                let s = lock(state);
                (s.result.is_some(), s.selected.len())
            };
            app.cycle_focus(has_result, chips, key.code == KeyCode::Tab);
            return None;
        }
        KeyCode::PageUp if app.show_logs => {
            app.log_scroll = app.log_scroll.saturating_add(10);
            return None;
        }
        KeyCode::PageDown if app.show_logs => {
            app.log_scroll = app.log_scroll.saturating_sub(10);
            return None;
        }
        _ => {}
    }

    match app.focus {
        Focus::Editor => handle_editor_key(key, app, state),
        Focus::Filters => handle_filters_key(key, app, state),
        Focus::Chips => handle_chips_key(key, app, state),
    }
    None
}

fn handle_editor_key(key: KeyEvent, app: &mut App, state: &SharedForm) {
    let mut s = lock(state);
    let len = s.input.chars().count();
    app.cursor = app.cursor.min(len);

    match key.code {
        KeyCode::Char(c) => app::insert_char(&mut s.input, &mut app.cursor, c),
        KeyCode::Enter => app::insert_char(&mut s.input, &mut app.cursor, '\n'),
        KeyCode::Backspace => app::backspace(&mut s.input, &mut app.cursor),
        KeyCode::Delete => app::delete(&mut s.input, app.cursor),
        KeyCode::Left => app.cursor = app.cursor.saturating_sub(1),
        KeyCode::Right => app.cursor = (app.cursor + 1).min(len),
        KeyCode::Up => app.cursor = app::move_vertical(&s.input, app.cursor, false),
        KeyCode::Down => app.cursor = app::move_vertical(&s.input, app.cursor, true),
        KeyCode::Home => app.cursor = app::line_start(&s.input, app.cursor),
        KeyCode::End => app.cursor = app::line_end(&s.input, app.cursor),
        KeyCode::Esc => {
            drop(s);
            app.focus = Focus::Filters;
            let has_result = lock(state).result.is_some();
            app.normalize(has_result, 0);
        }
        _ => {}
    }
}

fn handle_filters_key(key: KeyEvent, app: &mut App, state: &SharedForm) {
    let menu_open = lock(state).menu_open;

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char(',') => app.show_logs = !app.show_logs,
        KeyCode::Char('m') => {
            lock(state).toggle_menu();
        }
        KeyCode::Enter if !menu_open => {
            lock(state).set_menu_open(true);
        }
        KeyCode::Esc if menu_open => {
            lock(state).set_menu_open(false);
        }
        KeyCode::Up | KeyCode::Char('k') if menu_open => {
            app.menu_cursor = app.menu_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') if menu_open => {
            if app.menu_cursor + 1 < FilterOption::ALL.len() {
                app.menu_cursor += 1;
            }
        }
        KeyCode::Char(' ') | KeyCode::Enter if menu_open => {
            let option = FilterOption::ALL[app.menu_cursor.min(FilterOption::ALL.len() - 1)];
            let now = lock(state).toggle_filter(option);
            app.status_message = Some(format!(
                "{} {}",
                option.label(),
                if now { "shown" } else { "hidden" }
            ));
        }
        _ => {}
    }
}

fn handle_chips_key(key: KeyEvent, app: &mut App, state: &SharedForm) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char(',') => app.show_logs = !app.show_logs,
        KeyCode::Left | KeyCode::Char('h') => {
            app.chip_cursor = app.chip_cursor.saturating_sub(1);
        }
        KeyCode::Right | KeyCode::Char('l') => {
            let count = lock(state).selected.len();
            if app.chip_cursor + 1 < count {
                app.chip_cursor += 1;
            }
        }
        KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace | KeyCode::Enter => {
            let mut s = lock(state);
            let Some(option) = s.selected.iter().nth(app.chip_cursor) else {
                return;
            };
            // Dismissing a chip is a toggle-off.
            s.toggle_filter(option);
            let (has_result, remaining) = (s.result.is_some(), s.selected.len());
            drop(s);
            app.status_message = Some(format!("{} hidden", option.label()));
            app.normalize(has_result, remaining);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfhl_rs::ApiResult;
    use bfhl_rs::form::FormState;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char(c))
        }
    }

    fn with_result() -> SharedForm {
        let mut form = FormState::default();
        form.result = Some(ApiResult {
            numbers: vec!["1".into()],
            alphabets: vec!["a".into()],
            highest_lowercase_alphabet: vec!["a".into()],
        });
        form.shared()
    }

    #[test]
    fn typing_edits_the_shared_input() {
        let state = FormState::default().shared();
        lock(&state).set_input("");
        let mut app = App::new("");

        for c in ['[', '1', ']'] {
            handle_key_event(key(KeyCode::Char(c)), &mut app, &state);
        }
        handle_key_event(key(KeyCode::Left), &mut app, &state);
        handle_key_event(key(KeyCode::Char(',')), &mut app, &state);
        handle_key_event(key(KeyCode::Char('2')), &mut app, &state);
        assert_eq!(lock(&state).input, "[1,2]");
        assert!(!app.show_logs, "comma inserts text while editing");

        handle_key_event(key(KeyCode::Backspace), &mut app, &state);
        assert_eq!(lock(&state).input, "[1,]");
    }

    #[test]
    fn submit_and_quit_bindings() {
        let state = FormState::default().shared();
        let mut app = App::new("");
        assert_eq!(
            handle_key_event(ctrl('s'), &mut app, &state),
            Some(Action::Submit)
        );
        assert_eq!(
            handle_key_event(key(KeyCode::F(5)), &mut app, &state),
            Some(Action::Submit)
        );
        assert!(!app.should_quit);

        handle_key_event(key(KeyCode::Char('q')), &mut app, &state);
        assert!(!app.should_quit, "q types in the editor");

        handle_key_event(ctrl('c'), &mut app, &state);
        assert!(app.should_quit);
    }

    #[test]
    fn menu_checkboxes_toggle_filters_without_closing() {
        let state = with_result();
        let mut app = App::new("");
        handle_key_event(key(KeyCode::Tab), &mut app, &state);
        assert_eq!(app.focus, Focus::Filters);

        handle_key_event(key(KeyCode::Char('m')), &mut app, &state);
        assert!(lock(&state).menu_open);

        // Move to "Alphabets" and check it.
        handle_key_event(key(KeyCode::Down), &mut app, &state);
        handle_key_event(key(KeyCode::Down), &mut app, &state);
        handle_key_event(key(KeyCode::Char(' ')), &mut app, &state);
        {
            let s = lock(&state);
            assert!(s.selected.contains(FilterOption::Alphabets));
            assert!(s.menu_open, "menu stays open after a toggle");
        }

        // Uncheck "Numbers".
        handle_key_event(key(KeyCode::Up), &mut app, &state);
        handle_key_event(key(KeyCode::Up), &mut app, &state);
        handle_key_event(key(KeyCode::Enter), &mut app, &state);
        assert!(!lock(&state).selected.contains(FilterOption::Numbers));

        handle_key_event(key(KeyCode::Esc), &mut app, &state);
        assert!(!lock(&state).menu_open);
    }

    #[test]
    fn dismissing_a_chip_toggles_it_off() {
        let state = with_result();
        let mut app = App::new("");
        app.focus = Focus::Chips;
        handle_key_event(key(KeyCode::Right), &mut app, &state);
        assert_eq!(app.chip_cursor, 1);

        handle_key_event(key(KeyCode::Char('x')), &mut app, &state);
        {
            let s = lock(&state);
            assert!(s.selected.contains(FilterOption::Numbers));
            assert!(!s.selected.contains(FilterOption::HighestLowercaseAlphabet));
        }
        assert_eq!(app.chip_cursor, 0);

        handle_key_event(key(KeyCode::Delete), &mut app, &state);
        assert!(lock(&state).selected.is_empty());
        assert_eq!(app.focus, Focus::Filters);
    }

    #[test]
    fn logs_toggle_outside_the_editor() {
        let state = with_result();
        let mut app = App::new("");
        handle_key_event(ctrl('l'), &mut app, &state);
        assert!(app.show_logs);

        app.focus = Focus::Filters;
        handle_key_event(key(KeyCode::Char(',')), &mut app, &state);
        assert!(!app.show_logs);
    }
}
