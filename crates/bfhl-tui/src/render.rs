//! Rendering for the form.

use bfhl_rs::filter::FilterOption;
use bfhl_rs::form::{FormState, SharedForm, lock};
use bfhl_rs::ui::{LogLevel, LogLine};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{self, App, Focus};

/// Map a log level to a ratatui [`Style`].
pub fn log_level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Trace => Style::default().fg(Color::DarkGray),
        LogLevel::Debug => Style::default().fg(Color::Cyan),
        LogLevel::Info => Style::default().fg(Color::Green),
        LogLevel::Warn => Style::default().fg(Color::Yellow),
        LogLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

fn focus_border(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

// ── Root Render ───────────────────────────────────────────────────────

pub(crate) fn render(frame: &mut Frame, state: &SharedForm, app: &App, endpoint: &str) {
    // Clone the form in one shot so the lock is held only for the copy,
    // never while widgets are built.
    let snap: FormState = lock(state).clone();
    let area = frame.area();

    let (main, logs) = if app.show_logs {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);
        (split[0], Some(split[1]))
    } else {
        (area, None)
    };

    let has_result = snap.result.is_some();
    let mut constraints = vec![Constraint::Min(5)];
    if snap.error.is_some() {
        constraints.push(Constraint::Length(1));
    }
    if has_result {
        let menu_rows = if snap.menu_open {
            FilterOption::ALL.len() as u16
        } else {
            0
        };
        constraints.push(Constraint::Length(3 + menu_rows));
        constraints.push(Constraint::Length(
            (snap.rendered_lines().len() as u16).max(1) + 2,
        ));
    }
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(main);

    let mut next = 0;
    let mut take = || {
        let r = chunks[next];
        next += 1;
        r
    };

    render_editor(frame, take(), &snap, app, endpoint);
    if snap.error.is_some() {
        render_error(frame, take(), &snap);
    }
    if has_result {
        render_filters(frame, take(), &snap, app);
        render_response(frame, take(), &snap);
    }
    render_status(frame, take(), &snap, app);

    if let Some(area) = logs {
        render_logs(frame, area, &app.logs, app);
    }
}

// ── Editor ────────────────────────────────────────────────────────────

fn render_editor(frame: &mut Frame, area: Rect, snap: &FormState, app: &App, endpoint: &str) {
    let inner_height = area.height.saturating_sub(2) as usize;
    let cursor = app.cursor.min(snap.input.chars().count());
    let (line, col) = app::line_col(&snap.input, cursor);
    let scroll = line.saturating_sub(inner_height.saturating_sub(1));

    // Skip scrolled-off lines here; the paragraph offset is only a `u16`.
    let lines: Vec<Line> = snap
        .input
        .split('\n')
        .skip(scroll)
        .take(inner_height)
        .map(Line::raw)
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_border(app, Focus::Editor))
        .title(" API Input ")
        .title_bottom(Line::from(format!(" POST {endpoint} ")).right_aligned());

    frame.render_widget(Paragraph::new(lines).block(block), area);

    if app.focus == Focus::Editor {
        let x = area.x.saturating_add(1).saturating_add(to_u16(col));
        let y = area
            .y
            .saturating_add(1)
            .saturating_add(to_u16(line - scroll));
        if x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1) {
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}

/// Terminal coordinates are `u16`; clamp instead of wrapping.
fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ── Error Banner ──────────────────────────────────────────────────────

fn render_error(frame: &mut Frame, area: Rect, snap: &FormState) {
    let banner = Paragraph::new(Line::from(vec![
        Span::styled(" ! ", Style::default().fg(Color::White).bg(Color::Red)),
        Span::raw(" "),
        Span::styled(
            snap.error_message().to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    ]));
    frame.render_widget(banner, area);
}

// ── Filter Menu + Chips ───────────────────────────────────────────────

fn render_filters(frame: &mut Frame, area: Rect, snap: &FormState, app: &App) {
    let focused = app.focus == Focus::Filters;
    let arrow = if snap.menu_open { "\u{25b4}" } else { "\u{25be}" };
    let button_style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let mut lines = vec![Line::from(Span::styled(
        format!("[ Multi Filter {arrow} ]"),
        button_style,
    ))];

    if snap.menu_open {
        for (i, option) in FilterOption::ALL.into_iter().enumerate() {
            let checked = if snap.selected.contains(option) {
                "[x]"
            } else {
                "[ ]"
            };
            let style = if focused && i == app.menu_cursor {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("  {checked} {}", option.label()),
                style,
            )));
        }
    }

    let mut chips: Vec<Span> = Vec::new();
    for (i, option) in snap.selected.iter().enumerate() {
        let style = if app.focus == Focus::Chips && i == app.chip_cursor {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Black).bg(Color::Gray)
        };
        if i > 0 {
            chips.push(Span::raw(" "));
        }
        chips.push(Span::styled(format!(" {} \u{00d7} ", option.label()), style));
    }
    lines.push(Line::from(chips));

    let block = Block::default()
        .borders(Borders::LEFT | Borders::RIGHT | Borders::TOP)
        .border_style(focus_border(app, Focus::Filters))
        .title(" Filters ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ── Response ──────────────────────────────────────────────────────────

fn render_response(frame: &mut Frame, area: Rect, snap: &FormState) {
    let lines: Vec<Line> = snap
        .rendered_lines()
        .into_iter()
        .map(|l| Line::styled(l, Style::default().fg(Color::White)))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" Filtered Response ");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// ── Status Bar ────────────────────────────────────────────────────────

fn render_status(frame: &mut Frame, area: Rect, snap: &FormState, app: &App) {
    let line = if snap.is_submitting() {
        Line::from(Span::styled(
            format!(" Submitting\u{2026} ({} in flight)", snap.in_flight),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
    } else if let Some(ref msg) = app.status_message {
        Line::from(Span::styled(
            format!(" {msg}"),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let hint = match app.focus {
            Focus::Editor => "[Ctrl+S] submit  [Tab] filters  [Ctrl+L] logs  [Ctrl+C] quit",
            Focus::Filters if snap.menu_open => {
                "[Up/Down] move  [Space] check  [m/Esc] close  [Tab] next  [q] quit"
            }
            Focus::Filters => "[m/Enter] open menu  [Tab] next  [,] logs  [q] quit",
            Focus::Chips => "[Left/Right] move  [x] dismiss  [Tab] next  [q] quit",
        };
        Line::from(Span::styled(
            format!(" {hint}"),
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}

// ── Log Pane ──────────────────────────────────────────────────────────

fn render_logs(frame: &mut Frame, area: Rect, logs: &[LogLine], app: &App) {
    let inner_height = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = logs
        .iter()
        .filter(|log| !matches!(log.level, LogLevel::Trace))
        .map(|log| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", log.time),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{} ", log.level.label()),
                    log_level_style(log.level),
                ),
                Span::raw(log.message.as_str()),
            ])
        })
        .collect();

    let total = lines.len();
    let scroll = total
        .saturating_sub(inner_height)
        .saturating_sub(app.log_scroll);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Log ");

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((to_u16(scroll), 0))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// ── Tests ─────────────────────────────────────────────────────────────
