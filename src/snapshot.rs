/// GeoJSON snapshot output.
///
/// One run produces one FeatureCollection with a point feature per registry
/// entry. The document is assembled in memory and written in a single call;
/// the previous snapshot is only replaced once a run has got this far.

use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::logging::{self, DataSource};
use crate::model::{AvailabilityStatus, GenmonError};
use crate::registry::Registry;
use crate::status::{availability_for, StateMap};

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub generated_at_utc: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub geometry: PointGeometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    kind: &'static str,
    /// `[lon, lat]`, GeoJSON axis order.
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureProperties {
    pub infrastructure: String,
    pub fuel: String,
    #[serde(serialize_with = "round_one_decimal")]
    pub available_mw: f64,
    #[serde(serialize_with = "round_one_decimal")]
    pub unavailable_mw: f64,
    pub status: AvailabilityStatus,
}

/// MW figures are held unrounded and rounded only here, on the way out.
fn round_one_decimal<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to_tenth(*value))
}

/// Rounds the exact binary value to one decimal, ties to even.
///
/// `{:.1}` formatting does this; `(v * 10.0).round()` would not, since the
/// multiplication itself rounds (0.35 is stored just below 0.35).
fn round_to_tenth(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Joins registry entries with their resolved states, in registry order.
pub fn build_feature_collection(
    registry: &Registry,
    states: &StateMap,
    generated_at: DateTime<Utc>,
) -> FeatureCollection {
    let features = registry
        .iter()
        .map(|generator| {
            let (figures, status) = availability_for(states.get(&generator.unit_code));
            Feature {
                kind: "Feature",
                geometry: PointGeometry {
                    kind: "Point",
                    coordinates: [generator.longitude, generator.latitude],
                },
                properties: FeatureProperties {
                    infrastructure: generator.infrastructure.clone(),
                    fuel: generator.fuel.clone(),
                    available_mw: figures.available_mw,
                    unavailable_mw: figures.unavailable_mw,
                    status,
                },
            }
        })
        .collect();

    FeatureCollection {
        kind: "FeatureCollection",
        generated_at_utc: generated_at.to_rfc3339_opts(SecondsFormat::Micros, false),
        features,
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Writes `collection` as 2-space indented UTF-8 JSON, creating parent
/// directories as needed.
pub fn write_snapshot(path: &Path, collection: &FeatureCollection) -> Result<(), GenmonError> {
    let json = serde_json::to_string_pretty(collection)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| GenmonError::io(parent, e))?;
    }

    fs::write(path, json).map_err(|e| GenmonError::io(path, e))?;

    logging::info(
        DataSource::Snapshot,
        None,
        &format!("Wrote {} features to {}", collection.features.len(), path.display()),
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
