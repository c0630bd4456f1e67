/// Generator registry for the availability service.
///
/// Loads the static CSV list of generators (label, location, fuel) and keys
/// each row by the GU code found in its label. This is the single source of
/// truth for which units appear in the snapshot: every loaded record yields
/// exactly one output feature.
///
/// Expected header columns (by name):
/// - infrastructure (free text containing a GU code)
/// - lat
/// - lon
/// - fuel (optional)

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::logging::{self, DataSource};
use crate::model::{GenmonError, GeneratorRecord};
use crate::unit_code::extract_unit_code;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Generators keyed by unit code, iterated in first-seen file order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    records: Vec<GeneratorRecord>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record. A record with an already-known code replaces the
    /// earlier one in place (last row wins, first position kept).
    pub fn insert(&mut self, record: GeneratorRecord) {
        match self.index.get(&record.unit_code) {
            Some(&idx) => self.records[idx] = record,
            None => {
                self.index.insert(record.unit_code.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Looks up a generator by unit code. Returns `None` if not found.
    pub fn get(&self, unit_code: &str) -> Option<&GeneratorRecord> {
        self.index.get(unit_code).map(|&idx| &self.records[idx])
    }

    pub fn contains(&self, unit_code: &str) -> bool {
        self.index.contains_key(unit_code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratorRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Reads the registry CSV at `path`.
///
/// Rows with an empty label or no GU code are skipped. A missing required
/// column or a non-numeric `lat`/`lon` on a kept row aborts the load.
pub fn load_registry(path: &Path) -> Result<Registry, GenmonError> {
    let file = File::open(path).map_err(|e| GenmonError::io(path, e))?;
    let registry = read_registry(file)?;

    logging::info(
        DataSource::Registry,
        None,
        &format!("Loaded {} generators from {}", registry.len(), path.display()),
    );

    Ok(registry)
}

/// Parses registry CSV from any reader. Split out from `load_registry` so
/// tests can feed in-memory text.
pub fn read_registry<R: std::io::Read>(reader: R) -> Result<Registry, GenmonError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let columns = Columns::locate(&headers)?;

    let mut registry = Registry::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        // Row 1 is the header.
        let row = i + 2;

        let infrastructure = record.get(columns.infrastructure).unwrap_or("").trim();
        if infrastructure.is_empty() {
            logging::debug(DataSource::Registry, None, &format!("row {row}: empty label, skipped"));
            continue;
        }

        let Some(unit_code) = extract_unit_code(infrastructure) else {
            logging::debug(
                DataSource::Registry,
                None,
                &format!("row {row}: no GU code in '{infrastructure}', skipped"),
            );
            continue;
        };

        let latitude = parse_coordinate(&record, columns.lat, "lat", row)?;
        let longitude = parse_coordinate(&record, columns.lon, "lon", row)?;
        let fuel = columns
            .fuel
            .and_then(|idx| record.get(idx))
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        registry.insert(GeneratorRecord {
            unit_code,
            infrastructure: infrastructure.to_string(),
            latitude,
            longitude,
            fuel,
        });
    }

    Ok(registry)
}

struct Columns {
    infrastructure: usize,
    lat: usize,
    lon: usize,
    fuel: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, GenmonError> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);
        let required = |name: &'static str| position(name).ok_or(GenmonError::MissingColumn(name));

        Ok(Self {
            infrastructure: required("infrastructure")?,
            lat: required("lat")?,
            lon: required("lon")?,
            fuel: position("fuel"),
        })
    }
}

fn parse_coordinate(
    record: &StringRecord,
    idx: usize,
    field: &'static str,
    row: usize,
) -> Result<f64, GenmonError> {
    let raw = record.get(idx).unwrap_or("");
    raw.trim().parse().map_err(|_| GenmonError::ParseError {
        field,
        value: raw.to_string(),
        row,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_from(csv: &str) -> Result<Registry, GenmonError> {
        read_registry(csv.as_bytes())
    }

    #[test]
    fn test_loads_rows_keyed_by_gu_code() {
        let registry = registry_from(
            "infrastructure,lat,lon,fuel\n\
             Moneypoint GU_400850,52.6066,-9.4242,Coal\n\
             Tarbert gu_400180, 52.5833 ,-9.3667, Oil \n",
        )
        .unwrap();

        assert_eq!(registry.len(), 2);

        let mp = registry.get("GU_400850").expect("Moneypoint should be loaded");
        assert_eq!(mp.infrastructure, "Moneypoint GU_400850");
        assert_eq!(mp.latitude, 52.6066);
        assert_eq!(mp.longitude, -9.4242);
        assert_eq!(mp.fuel, "Coal");

        let tb = registry.get("GU_400180").expect("label code is upper-cased");
        assert_eq!(tb.latitude, 52.5833);
        assert_eq!(tb.fuel, "Oil");
    }

    #[test]
    fn test_rows_without_code_or_label_are_skipped() {
        let registry = registry_from(
            "infrastructure,lat,lon,fuel\n\
             ,53.0,-7.0,Gas\n\
             \"   \",53.0,-7.0,Gas\n\
             Unnamed wind farm,53.0,-7.0,Wind\n\
             Aghada GU_400500,51.83,-8.21,Gas\n",
        )
        .unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("GU_400500"));
    }

    #[test]
    fn test_bad_coordinates_on_skipped_rows_are_ignored() {
        let registry = registry_from(
            "infrastructure,lat,lon,fuel\n\
             No code here,north,west,Gas\n\
             Aghada GU_400500,51.83,-8.21,Gas\n",
        )
        .unwrap();

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_non_numeric_latitude_is_fatal() {
        let err = registry_from(
            "infrastructure,lat,lon,fuel\n\
             Aghada GU_400500,51.83,-8.21,Gas\n\
             Poolbeg GU_400600,north,-6.2,Gas\n",
        )
        .unwrap_err();

        match err {
            GenmonError::ParseError { field, value, row } => {
                assert_eq!(field, "lat");
                assert_eq!(value, "north");
                assert_eq!(row, 3);
            }
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_fuel_column_defaults_to_empty() {
        let registry = registry_from(
            "infrastructure,lat,lon\n\
             Aghada GU_400500,51.83,-8.21\n",
        )
        .unwrap();

        assert_eq!(registry.get("GU_400500").unwrap().fuel, "");
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let err = registry_from("infrastructure,lat\nAghada GU_400500,51.83\n").unwrap_err();
        assert!(matches!(err, GenmonError::MissingColumn("lon")));
    }

    #[test]
    fn test_duplicate_code_last_row_wins_in_first_position() {
        let registry = registry_from(
            "infrastructure,lat,lon,fuel\n\
             Aghada GU_400500,51.83,-8.21,Gas\n\
             Poolbeg GU_400600,53.34,-6.19,Gas\n\
             Aghada CCGT GU_400500,51.84,-8.22,Gas\n",
        )
        .unwrap();

        assert_eq!(registry.len(), 2);

        let codes: Vec<_> = registry.iter().map(|g| g.unit_code.as_str()).collect();
        assert_eq!(codes, vec!["GU_400500", "GU_400600"]);

        let aghada = registry.get("GU_400500").unwrap();
        assert_eq!(aghada.infrastructure, "Aghada CCGT GU_400500");
        assert_eq!(aghada.latitude, 51.84);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = load_registry(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, GenmonError::Io { .. }));
    }
}
