//! Logging infrastructure for termcordion.
//!
//! A small process-wide logger with optional file output and an in-memory
//! ring of recent entries. Library crates log through the free functions
//! below; until [`init`] is called every call is a silent no-op, so widgets
//! and registries can be used (and tested) without any logging setup.

use chrono::Local;
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::Write as IoWrite;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

/// Log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Timestamp in HH:MM:SS format
    pub timestamp: String,
    /// Message level
    pub level: LogLevel,
    /// Message text
    pub message: String,
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert log level to string
    pub fn to_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

#[derive(Debug)]
struct Logger {
    /// Most recent entries, oldest first
    entries: VecDeque<LogEntry>,
    max_entries: usize,
    min_level: LogLevel,
    /// None keeps the log in memory only
    file_path: Option<PathBuf>,
}

impl Logger {
    fn new(file_path: Option<PathBuf>, max_entries: usize, min_level: LogLevel) -> Self {
        if let Some(path) = &file_path {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }

            // Clear log file on startup
            if let Ok(mut file) = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
            {
                let _ = writeln!(file, "=== termcordion log start ===");
            }
        }

        Self {
            entries: VecDeque::new(),
            max_entries,
            min_level,
            file_path,
        }
    }

    fn add_entry(&mut self, level: LogLevel, message: String) {
        if level < self.min_level {
            return;
        }

        let timestamp = Local::now().format("%H:%M:%S").to_string();

        // Write to file (create if deleted)
        if let Some(path) = &self.file_path {
            if let Ok(mut file) = OpenOptions::new().append(true).create(true).open(path) {
                let _ = writeln!(file, "[{}] {}: {}", timestamp, level.to_str(), message);
            }
        }

        self.entries.push_back(LogEntry {
            timestamp,
            level,
            message,
        });

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    fn get_entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    fn last_entry(&self) -> Option<LogEntry> {
        self.entries.back().cloned()
    }
}

/// Global logger instance that persists for the application lifetime.
static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

/// Initialize the global logger
///
/// Should be called once at application startup. Subsequent calls are ignored.
///
/// # Arguments
///
/// * `file_path` - Optional path to the log file
/// * `max_entries` - Maximum number of log entries to keep in memory
/// * `min_level` - Minimum log level to record (Debug, Info, Warn, Error)
pub fn init(file_path: Option<PathBuf>, max_entries: usize, min_level: LogLevel) {
    LOGGER.get_or_init(|| Mutex::new(Logger::new(file_path, max_entries, min_level)));
}

fn log(level: LogLevel, message: impl Into<String>) {
    let Some(logger) = LOGGER.get() else {
        return;
    };
    if let Ok(mut logger) = logger.lock() {
        logger.add_entry(level, message.into());
    }
}

/// Log a debug message
pub fn debug(message: impl Into<String>) {
    log(LogLevel::Debug, message);
}

/// Log an informational message
pub fn info(message: impl Into<String>) {
    log(LogLevel::Info, message);
}

/// Log a warning message
pub fn warn(message: impl Into<String>) {
    log(LogLevel::Warn, message);
}

/// Log an error message
pub fn error(message: impl Into<String>) {
    log(LogLevel::Error, message);
}

/// Get all log entries currently held in memory.
pub fn get_entries() -> Vec<LogEntry> {
    match LOGGER.get().map(|l| l.lock()) {
        Some(Ok(logger)) => logger.get_entries(),
        _ => Vec::new(),
    }
}

/// Most recent entry held in memory, if any.
pub fn last_entry() -> Option<LogEntry> {
    match LOGGER.get().map(|l| l.lock()) {
        Some(Ok(logger)) => logger.last_entry(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("Error".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_filtering() {
        let mut logger = Logger::new(None, 10, LogLevel::Info);
        logger.add_entry(LogLevel::Debug, "hidden".to_string());
        logger.add_entry(LogLevel::Warn, "shown".to_string());

        let entries = logger.get_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "shown");
        assert_eq!(entries[0].level, LogLevel::Warn);
    }

    #[test]
    fn test_ring_is_bounded() {
        let mut logger = Logger::new(None, 3, LogLevel::Debug);
        for i in 0..5 {
            logger.add_entry(LogLevel::Info, format!("msg {}", i));
        }

        let messages: Vec<_> = logger
            .get_entries()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(messages, vec!["msg 2", "msg 3", "msg 4"]);
        assert_eq!(logger.last_entry().map(|e| e.message), Some("msg 4".to_string()));
    }

    #[test]
    fn test_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("termcordion.log");

        let mut logger = Logger::new(Some(path.clone()), 10, LogLevel::Debug);
        logger.add_entry(LogLevel::Error, "boom".to_string());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("=== termcordion log start ==="));
        assert!(content.contains("ERROR: boom"));
    }
}
