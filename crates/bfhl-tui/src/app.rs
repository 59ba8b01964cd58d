//! TUI-local state (not shared with the submission controller).

use bfhl_rs::filter::FilterOption;
use bfhl_rs::ui::LogLine;

/// Which part of the form receives key input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Focus {
    /// The JSON text editor. Printable keys insert text.
    Editor,
    /// The "Multi Filter" menu button and, when open, its checkbox list.
    Filters,
    /// The row of selected-filter chips.
    Chips,
}

/// Something the event loop must do outside the key handler.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Submit,
}

pub(crate) struct App {
    pub(crate) focus: Focus,
    /// Cursor position in the input buffer, in chars.
    pub(crate) cursor: usize,
    /// Highlighted row in the checkbox list (index into `FilterOption::ALL`).
    pub(crate) menu_cursor: usize,
    /// Highlighted chip (index into the selection, insertion order).
    pub(crate) chip_cursor: usize,
    /// Whether the logs pane is visible (toggled with `,` or Ctrl+L).
    pub(crate) show_logs: bool,
    /// Offset from the bottom of the log (0 = follow tail).
    pub(crate) log_scroll: usize,
    /// Lines drained from the tracing layer.
    pub(crate) logs: Vec<LogLine>,
    /// Status messages shown temporarily at the bottom.
    pub(crate) status_message: Option<String>,
    pub(crate) should_quit: bool,
}

impl App {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            focus: Focus::Editor,
            cursor: input.chars().count(),
            menu_cursor: 0,
            chip_cursor: 0,
            show_logs: false,
            log_scroll: 0,
            logs: Vec::new(),
            status_message: None,
            should_quit: false,
        }
    }

    /// Pull focus and cursors back inside what is currently on screen.
    ///
    /// The filter controls exist only while a result is shown, and a
    /// submission clears the result.
    pub(crate) fn normalize(&mut self, has_result: bool, chip_count: usize) {
        match self.focus {
            Focus::Filters if !has_result => self.focus = Focus::Editor,
            Focus::Chips if !has_result || chip_count == 0 => {
                self.focus = if has_result {
                    Focus::Filters
                } else {
                    Focus::Editor
                };
            }
            _ => {}
        }
        if chip_count == 0 {
            self.chip_cursor = 0;
        } else if self.chip_cursor >= chip_count {
            self.chip_cursor = chip_count - 1;
        }
        if self.menu_cursor >= FilterOption::ALL.len() {
            self.menu_cursor = FilterOption::ALL.len() - 1;
        }
    }

    /// Cycle focus forward (or backward) through the visible controls.
    pub(crate) fn cycle_focus(&mut self, has_result: bool, chip_count: usize, forward: bool) {
        let mut order = vec![Focus::Editor];
        if has_result {
            order.push(Focus::Filters);
            if chip_count > 0 {
                order.push(Focus::Chips);
            }
        }
        let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % order.len()
        } else {
            (pos + order.len() - 1) % order.len()
        };
        self.focus = order[next];
    }
}

// ── Editor helpers ────────────────────────────────────────────────────

/// Byte offset of the `char_idx`-th char (or the end of `text`).
pub(crate) fn byte_offset(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map_or(text.len(), |(i, _)| i)
}

pub(crate) fn insert_char(text: &mut String, cursor: &mut usize, c: char) {
    let at = byte_offset(text, *cursor);
    text.insert(at, c);
    *cursor += 1;
}

/// Delete the char before the cursor.
pub(crate) fn backspace(text: &mut String, cursor: &mut usize) {
    if *cursor == 0 {
        return;
    }
    *cursor -= 1;
    let at = byte_offset(text, *cursor);
    text.remove(at);
}

/// Delete the char under the cursor.
pub(crate) fn delete(text: &mut String, cursor: usize) {
    let at = byte_offset(text, cursor);
    if at < text.len() {
        text.remove(at);
    }
}

/// Zero-based (line, column) of a char cursor.
pub(crate) fn line_col(text: &str, cursor: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    for c in text.chars().take(cursor) {
        if c == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Char cursor for a (line, column), clamping the column to the line length.
fn cursor_at(text: &str, line: usize, col: usize) -> usize {
    let mut idx = 0;
    for (i, l) in text.split('\n').enumerate() {
        let len = l.chars().count();
        if i == line {
            return idx + col.min(len);
        }
        idx += len + 1;
    }
    text.chars().count()
}

pub(crate) fn move_vertical(text: &str, cursor: usize, down: bool) -> usize {
    let (line, col) = line_col(text, cursor);
    let lines = text.split('\n').count();
    let target = if down {
        (line + 1).min(lines.saturating_sub(1))
    } else {
        line.saturating_sub(1)
    };
    if target == line {
        return cursor;
    }
    cursor_at(text, target, col)
}

pub(crate) fn line_start(text: &str, cursor: usize) -> usize {
    let (line, _) = line_col(text, cursor);
    cursor_at(text, line, 0)
}

pub(crate) fn line_end(text: &str, cursor: usize) -> usize {
    let (line, _) = line_col(text, cursor);
    cursor_at(text, line, usize::MAX)
}
