//! Operator-facing progress logging.
//!
//! A single global [`Logger`] prints level-prefixed lines (or one JSON object
//! per line) and filters by a minimum level. Pipeline code uses the
//! `log_*` helpers instead of printing directly.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Log level, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Info,
            1 => Self::Success,
            2 => Self::Warning,
            _ => Self::Error,
        }
    }
}

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for nested logs)
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }
}

/// Global logger
pub static LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

/// Filters and prints log entries.
pub struct Logger {
    min_level: AtomicU8,
    json: AtomicBool,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            min_level: AtomicU8::new(LogLevel::Info as u8),
            json: AtomicBool::new(false),
        }
    }

    /// Drop entries below `level`.
    pub fn set_min_level(&self, level: LogLevel) {
        self.min_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn min_level(&self) -> LogLevel {
        LogLevel::from_u8(self.min_level.load(Ordering::Relaxed))
    }

    pub fn set_format(&self, format: LogFormat) {
        self.json.store(format == LogFormat::Json, Ordering::Relaxed);
    }

    pub fn format(&self) -> LogFormat {
        if self.json.load(Ordering::Relaxed) {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }

    /// Render an entry without printing it. `None` when filtered out.
    pub fn render(&self, entry: &LogEntry) -> Option<String> {
        if entry.level < self.min_level() {
            return None;
        }
        match self.format() {
            LogFormat::Json => serde_json::to_string(entry).ok(),
            LogFormat::Text => {
                let prefix = match entry.level {
                    LogLevel::Info => "   ",
                    LogLevel::Success => "   ✓",
                    LogLevel::Warning => "   ⚠️",
                    LogLevel::Error => "   ❌",
                };
                let indent = "   ".repeat(entry.indent as usize);
                Some(format!("{}{} {}", indent, prefix, entry.message))
            }
        }
    }

    /// Print an entry; warnings and errors go to stderr.
    pub fn log(&self, entry: LogEntry) {
        if let Some(line) = self.render(&entry) {
            if entry.level >= LogLevel::Warning {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LOGGER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOGGER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOGGER.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOGGER.log(LogEntry::error(msg));
}

pub fn log_warning_indent(msg: impl Into<String>, indent: u8) {
    LOGGER.log(LogEntry::warning(msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_rendering() {
        let logger = Logger::new();
        let line = logger.render(&LogEntry::success("Read 3 rows")).unwrap();
        assert_eq!(line, "   ✓ Read 3 rows");

        let nested = logger
            .render(&LogEntry::warning("line 4: surname").with_indent(1))
            .unwrap();
        assert!(nested.starts_with("      ⚠️"));
    }

    #[test]
    fn test_min_level_filters() {
        let logger = Logger::new();
        logger.set_min_level(LogLevel::Warning);
        assert!(logger.render(&LogEntry::info("hidden")).is_none());
        assert!(logger.render(&LogEntry::success("hidden")).is_none());
        assert!(logger.render(&LogEntry::warning("shown")).is_some());
        assert!(logger.render(&LogEntry::error("shown")).is_some());
    }

    #[test]
    fn test_fatal_error_survives_quiet_mode() {
        let logger = Logger::new();
        logger.set_min_level(LogLevel::Warning);

        let entry = LogEntry::error("Error: File missing.csv does not exist");
        let line = logger.render(&entry).unwrap();
        assert_eq!(line, "   ❌ Error: File missing.csv does not exist");

        logger.set_format(LogFormat::Json);
        let line = logger.render(&entry).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "error");
        assert_eq!(value["message"], "Error: File missing.csv does not exist");
    }

    #[test]
    fn test_json_rendering() {
        let logger = Logger::new();
        logger.set_format(LogFormat::Json);
        let line = logger.render(&LogEntry::error("boom")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "error");
        assert_eq!(value["message"], "boom");
        assert_eq!(value["indent"], 0);
    }
}
