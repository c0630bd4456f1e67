/// Structured logging for the generator availability service
///
/// Provides context-rich logging with unit-code identifiers, timestamps and
/// severity levels. Supports both console output and file-based logging for
/// scheduled (cron/systemd timer) runs. Console output is written to stderr
/// at every level, so stdout stays free for the result line.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

use crate::model::GenmonError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = GenmonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(GenmonError::Config(format!("unknown log level '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Registry,
    Umm,
    Snapshot,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Registry => write!(f, "REG"),
            DataSource::Umm => write!(f, "UMM"),
            DataSource::Snapshot => write!(f, "OUT"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - e.g. the API is in a maintenance window
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut guard) = LOGGER.lock() {
            *guard = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, source: &DataSource, unit_code: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

        let unit_part = unit_code.map(|s| format!(" [{}]", s)).unwrap_or_default();
        let log_entry = format!("{} {} {}{}: {}", timestamp, level, source, unit_part, message);

        // Console output. Every level goes to stderr: stdout carries only the
        // run's result line.
        if self.console_timestamps {
            eprintln!("{}", log_entry);
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, unit_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, unit_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}{}: {}", source, unit_part, message),
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn emit(level: LogLevel, source: DataSource, unit_code: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &source, unit_code, message);
        }
    }
}

/// Log a general informational message
pub fn info(source: DataSource, unit_code: Option<&str>, message: &str) {
    emit(LogLevel::Info, source, unit_code, message);
}

/// Log a warning message
pub fn warn(source: DataSource, unit_code: Option<&str>, message: &str) {
    emit(LogLevel::Warning, source, unit_code, message);
}

/// Log an error message
pub fn error(source: DataSource, unit_code: Option<&str>, message: &str) {
    emit(LogLevel::Error, source, unit_code, message);
}

/// Log a debug message
pub fn debug(source: DataSource, unit_code: Option<&str>, message: &str) {
    emit(LogLevel::Debug, source, unit_code, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a UMM fetch failure.
pub fn classify_umm_failure(err: &GenmonError) -> FailureType {
    match err {
        // 503 is what the API returns during its announced maintenance windows
        GenmonError::Http(503) => FailureType::Expected,
        GenmonError::Http(_) | GenmonError::Request(_) => FailureType::Unexpected,
        // Body was not JSON: an API change or a proxy error page
        _ => FailureType::Unknown,
    }
}

/// Log a fetch failure with automatic classification.
///
/// The run still aborts; this only decides how loudly it is reported.
pub fn log_umm_failure(operation: &str, err: &GenmonError) {
    let failure_type = classify_umm_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => warn(DataSource::Umm, None, &message),
        FailureType::Unexpected | FailureType::Unknown => error(DataSource::Umm, None, &message),
    }
}

// ---------------------------------------------------------------------------
// Run Summary Logging
// ---------------------------------------------------------------------------

/// Log the outcome of one snapshot run.
pub fn log_run_summary(messages: usize, matched_units: usize, online: usize, partial: usize, offline: usize) {
    let message = format!(
        "Run complete: {} messages, {} units matched; {} online, {} partial, {} offline",
        messages, matched_units, online, partial, offline
    );

    if messages == 0 {
        // Every generator falls back to the online default.
        warn(DataSource::System, None, &message);
    } else {
        info(DataSource::System, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!(" error ".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_failure_classification() {
        assert_eq!(classify_umm_failure(&GenmonError::Http(503)), FailureType::Expected);
        assert_eq!(classify_umm_failure(&GenmonError::Http(500)), FailureType::Unexpected);

        let json_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        assert_eq!(classify_umm_failure(&GenmonError::Json(json_err)), FailureType::Unknown);
    }

    #[test]
    fn test_file_logging_appends_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genmon.log");
        let path_str = path.to_str().unwrap();

        let logger = Logger {
            min_level: LogLevel::Info,
            log_file: Some(path_str.to_string()),
            console_timestamps: true,
        };
        logger.log(LogLevel::Debug, &DataSource::Umm, None, "filtered out");
        logger.log(LogLevel::Info, &DataSource::Umm, Some("GU_400850"), "matched");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("filtered out"));
        assert!(contents.contains("INFO UMM [GU_400850]: matched"));
    }
}
