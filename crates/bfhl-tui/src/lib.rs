//! Terminal form for `bfhl-rs`.
//!
//! Renders the shared [`FormState`](bfhl_rs::form::FormState) with ratatui +
//! crossterm: a multi-line JSON editor, the "Multi Filter" menu with one
//! checkbox per filter, dismissible chips for the selected filters, the
//! error banner and the filtered response.
//!
//! # Quick start
//!
//! ```ignore
//! use bfhl_rs::prelude::*;
//! use bfhl_tui::{TuiConfig, spawn_tui};
//! use std::sync::Arc;
//!
//! let config = BfhlConfig::resolve(None, None)?;
//! let state = config.initial_form_state().shared();
//! let controller = Arc::new(SubmissionController::new(BfhlClient::new(&config)?, state));
//! let handle = spawn_tui(controller, tokio::runtime::Handle::current(), TuiConfig::default());
//! handle.join().unwrap();
//! ```

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use bfhl_rs::form::lock;
use bfhl_rs::submit::SubmissionController;
use bfhl_rs::ui::tracing::LogBuffer;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{cursor, execute};
use ratatui::prelude::*;
use tokio::runtime::Handle;
use tracing::debug;

mod app;
mod input;
mod render;

pub use render::log_level_style;

use app::{Action, App};
use input::handle_key_event;
use render::render;

/// Configuration for the TUI.
pub struct TuiConfig {
    /// Optional log buffer from the tracing layer.
    ///
    /// When set, the TUI drains pending log lines from this buffer once per
    /// frame into its log pane.
    pub log_buffer: Option<LogBuffer>,
    /// How long to wait for a key before redrawing.
    pub poll_interval: Duration,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            log_buffer: None,
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Spawn the TUI on a dedicated OS thread.
///
/// Submissions are spawned onto `runtime`, so the form keeps redrawing
/// while a request is outstanding.
pub fn spawn_tui(
    controller: Arc<SubmissionController>,
    runtime: Handle,
    config: TuiConfig,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        if let Err(e) = run_tui(controller, &runtime, &config) {
            eprintln!("TUI error: {e}");
        }
    })
}

/// Run the TUI event loop (blocking). Call this from a dedicated OS thread.
///
/// Returns when the user quits.
pub fn run_tui(
    controller: Arc<SubmissionController>,
    runtime: &Handle,
    config: &TuiConfig,
) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Show)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let state = controller.state().clone();
    let endpoint = controller.client().endpoint().to_string();
    let mut app = App::new(&lock(&state).input);

    loop {
        if app.should_quit {
            break;
        }

        if let Some(ref log_buf) = config.log_buffer {
            log_buf.flush_into(&mut app.logs);
        }

        let (has_result, chips) = {
            let s = lock(&state);
            (s.result.is_some(), s.selected.len())
        };
        app.normalize(has_result, chips);

        terminal.draw(|frame| render(frame, &state, &app, &endpoint))?;

        if event::poll(config.poll_interval)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(Action::Submit) = handle_key_event(key, &mut app, &state)
        {
            app.status_message = None;
            let raw = lock(&state).input.clone();
            let controller = controller.clone();
            debug!("Submitting {} bytes from the editor", raw.len());
            runtime.spawn(async move {
                controller.submit(&raw).await;
            });
        }
    }

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tui_config_default() {
        let config = TuiConfig::default();
        assert!(config.log_buffer.is_none());
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }
}
