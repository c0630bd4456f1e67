/// Core data types for the generator availability service.
///
/// This module defines the shared domain model imported by all other modules:
/// registry records, the typed view of UMM messages, per-unit state and the
/// status label written to the snapshot. It contains no I/O.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Registry types
// ---------------------------------------------------------------------------

/// A generator known to the registry, keyed by its GU code.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorRecord {
    /// Canonical unit code, e.g. `GU_400850`.
    pub unit_code: String,
    /// Free-text label as written in the registry file.
    pub infrastructure: String,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    /// Fuel type, empty when the registry leaves it blank.
    pub fuel: String,
}

// ---------------------------------------------------------------------------
// UMM message types
// ---------------------------------------------------------------------------

/// One capacity window inside a generation unit.
///
/// Timestamps are already normalized to UTC. A `None` endpoint means the
/// source value was missing or unparsable; such a period is never active.
#[derive(Debug, Clone, PartialEq)]
pub struct TimePeriod {
    pub start: Option<DateTime<Utc>>,
    pub stop: Option<DateTime<Utc>>,
    pub available_mw: Option<f64>,
    pub unavailable_mw: Option<f64>,
}

/// A generation unit named by a message, with its periods in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationUnit {
    pub name: Option<String>,
    pub time_periods: Vec<TimePeriod>,
}

/// An Urgent Market Message reduced to the parts this service reads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UmmMessage {
    pub generation_units: Vec<GenerationUnit>,
}

// ---------------------------------------------------------------------------
// State and status
// ---------------------------------------------------------------------------

/// Available/unavailable capacity chosen for a unit at the evaluation instant.
///
/// The two values always come from the same period; they are never mixed
/// across messages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitState {
    pub available_mw: f64,
    pub unavailable_mw: f64,
}

/// Availability classification written to each snapshot feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Online,
    Partial,
    Offline,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Online => "online",
            AvailabilityStatus::Partial => "partial",
            AvailabilityStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that abort a run. Record-level problems are skipped, not raised.
#[derive(Debug, thiserror::Error)]
pub enum GenmonError {
    /// The configuration file or an override is invalid.
    #[error("Config error: {0}")]
    Config(String),
    /// A file could not be read, created or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The registry file is not readable CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// A required registry column is absent from the header row.
    #[error("Missing column '{0}' in registry header")]
    MissingColumn(&'static str),
    /// A registry field that must be numeric is not.
    #[error("Parse error: invalid {field} '{value}' on registry row {row}")]
    ParseError {
        field: &'static str,
        value: String,
        row: usize,
    },
    /// Non-2xx HTTP response from the UMM API.
    #[error("HTTP error: {0}")]
    Http(u16),
    /// The request never produced a response (DNS, connect, timeout).
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The response body, or the snapshot, could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenmonError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenmonError::Io {
            path: path.into(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
