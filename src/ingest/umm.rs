/// Nord Pool UMM (Urgent Market Message) API client
///
/// Retrieves outage and availability messages for generation units in one
/// bidding area. The API response is weakly typed: any field may be missing
/// or carry an unexpected JSON type. This module converts it straight into
/// `UmmMessage` / `GenerationUnit` / `TimePeriod`, dropping whatever does not
/// fit, so nothing downstream touches `serde_json::Value`.
///
/// API Documentation: https://ummapi.nordpoolgroup.com/

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::config::ApiConfig;
use crate::logging::{self, DataSource};
use crate::model::{GenerationUnit, GenmonError, TimePeriod, UmmMessage};

// ============================================================================
// API Client Functions
// ============================================================================

/// Builds the blocking HTTP client with the configured timeout.
pub fn build_client(api: &ApiConfig) -> Result<reqwest::blocking::Client, GenmonError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(api.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch all messages for the configured area, outdated ones included.
///
/// Outdated messages are requested on purpose: the window resolver decides
/// which periods are current, not the server.
///
/// # Errors
/// Network failures and non-2xx responses abort the run. A body that is not
/// JSON at all is also fatal; a JSON body of the wrong shape is not.
pub fn fetch_messages(
    client: &reqwest::blocking::Client,
    api: &ApiConfig,
) -> Result<Vec<UmmMessage>, GenmonError> {
    let limit = api.limit.to_string();

    logging::debug(
        DataSource::Umm,
        None,
        &format!("GET {} areas={} limit={}", api.base_url, api.area, limit),
    );

    let response = client
        .get(&api.base_url)
        .header("Accept", "application/json")
        .query(&[
            ("areas", api.area.as_str()),
            ("limit", limit.as_str()),
            ("IncludeOutdated", "true"),
        ])
        .send()?;

    if !response.status().is_success() {
        return Err(GenmonError::Http(response.status().as_u16()));
    }

    let body = response.text()?;
    let payload: Value = serde_json::from_str(&body)?;
    let messages = parse_messages(&payload);

    logging::info(
        DataSource::Umm,
        None,
        &format!("Received {} messages for area {}", messages.len(), api.area),
    );

    Ok(messages)
}

// ============================================================================
// Boundary conversion
// ============================================================================

/// Converts a decoded response body into typed messages.
///
/// A missing or non-array `items` yields no messages. Items, units and
/// periods that are not JSON objects are skipped.
pub fn parse_messages(payload: &Value) -> Vec<UmmMessage> {
    let Some(items) = payload.get("items").and_then(Value::as_array) else {
        logging::debug(DataSource::Umm, None, "response has no 'items' array");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(parse_message)
        .collect()
}

fn parse_message(item: &Map<String, Value>) -> UmmMessage {
    UmmMessage {
        generation_units: objects(item.get("generationUnits"))
            .map(parse_generation_unit)
            .collect(),
    }
}

fn parse_generation_unit(unit: &Map<String, Value>) -> GenerationUnit {
    GenerationUnit {
        name: unit.get("name").and_then(Value::as_str).map(str::to_string),
        time_periods: objects(unit.get("timePeriods"))
            .map(parse_time_period)
            .collect(),
    }
}

fn parse_time_period(period: &Map<String, Value>) -> TimePeriod {
    TimePeriod {
        start: period.get("eventStart").and_then(Value::as_str).and_then(parse_timestamp),
        stop: period.get("eventStop").and_then(Value::as_str).and_then(parse_timestamp),
        available_mw: period.get("availableCapacity").and_then(Value::as_f64),
        unavailable_mw: period.get("unavailableCapacity").and_then(Value::as_f64),
    }
}

/// Iterates the object elements of an optional JSON array.
fn objects(value: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

// ============================================================================
// Timestamps
// ============================================================================

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 timestamp and normalizes it to UTC.
///
/// Accepts RFC 3339 (`2024-05-01T12:00:00+02:00`, `...Z`), offsets written
/// without a colon (`+0200`) or without minutes (`+02`), naive date-times
/// (assumed UTC) and bare dates (midnight UTC). Returns `None` for anything
/// else.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ============================================================================
// Tests
// ============================================================================
