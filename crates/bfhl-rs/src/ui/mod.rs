//! Frontend-agnostic log capture types.
//!
//! Terminal frontends cannot let `tracing` write to stdout while they own
//! the screen. [`tracing::UiTracingLayer`] captures events into a
//! [`tracing::LogBuffer`] instead; the frontend drains the buffer into its
//! own `Vec<LogLine>` once per frame via [`append_logs`].

pub mod tracing;

use serde::{Deserialize, Serialize};

/// Maximum log lines kept in memory.
pub const MAX_LOG_LINES: usize = 2000;
/// Trim to this many when the cap is exceeded.
pub const LOG_TRIM_TO: usize = 1200;

/// A single log line captured from tracing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogLine {
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

/// Log severity level (mirrors tracing levels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Short fixed-width label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO ",
            Self::Warn => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

/// Append `lines` to `logs`, dropping the oldest entries past the cap.
pub fn append_logs(logs: &mut Vec<LogLine>, lines: Vec<LogLine>) {
    if lines.is_empty() {
        return;
    }
    logs.extend(lines);
    trim_logs(logs);
}

pub(crate) fn trim_logs(logs: &mut Vec<LogLine>) {
    if logs.len() > MAX_LOG_LINES {
        let drain = logs.len() - LOG_TRIM_TO;
        logs.drain(..drain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(i: usize) -> LogLine {
        LogLine {
            time: format!("{i}"),
            level: LogLevel::Info,
            message: format!("msg {i}"),
        }
    }

    #[test]
    fn log_level_labels() {
        assert_eq!(LogLevel::Info.label(), "INFO ");
        assert_eq!(LogLevel::Error.label(), "ERROR");
        assert_eq!(LogLevel::Debug.label(), "DEBUG");
        assert_eq!(LogLevel::Trace.label(), "TRACE");
        assert_eq!(LogLevel::Warn.label(), "WARN ");
    }

    #[test]
    fn append_trims_oldest() {
        let mut logs: Vec<LogLine> = (0..MAX_LOG_LINES).map(line).collect();
        append_logs(&mut logs, vec![line(MAX_LOG_LINES)]);
        assert_eq!(logs.len(), LOG_TRIM_TO);
        assert_eq!(logs.last().unwrap().time, MAX_LOG_LINES.to_string());
    }

    #[test]
    fn append_nothing_is_noop() {
        let mut logs = vec![line(0)];
        append_logs(&mut logs, Vec::new());
        assert_eq!(logs.len(), 1);
    }
}
