/// One complete snapshot run: registry + UMM fetch -> states -> GeoJSON.
///
/// Runs are stateless. Nothing is carried between invocations, and any
/// fatal error returns before the snapshot file is touched.

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::ingest::umm;
use crate::logging;
use crate::model::{AvailabilityStatus, GenmonError};
use crate::registry::load_registry;
use crate::snapshot::{build_feature_collection, write_snapshot};
use crate::status::collect_unit_states;

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub messages: usize,
    pub matched_units: usize,
    pub generators: usize,
    pub online: usize,
    pub partial: usize,
    pub offline: usize,
}

/// Executes one run evaluated at `now` and writes the snapshot.
pub fn run_once(cfg: &AppConfig, now: DateTime<Utc>) -> Result<RunSummary, GenmonError> {
    let registry = load_registry(&cfg.paths.registry_csv)?;

    let client = umm::build_client(&cfg.api)?;
    let messages = umm::fetch_messages(&client, &cfg.api).inspect_err(|e| {
        logging::log_umm_failure("UMM fetch", e);
    })?;

    let states = collect_unit_states(&messages, &registry, now);
    let collection = build_feature_collection(&registry, &states, now);

    let mut summary = RunSummary {
        messages: messages.len(),
        matched_units: states.len(),
        generators: collection.features.len(),
        ..RunSummary::default()
    };
    for feature in &collection.features {
        match feature.properties.status {
            AvailabilityStatus::Online => summary.online += 1,
            AvailabilityStatus::Partial => summary.partial += 1,
            AvailabilityStatus::Offline => summary.offline += 1,
        }
    }

    write_snapshot(&cfg.paths.output_geojson, &collection)?;

    logging::log_run_summary(
        summary.messages,
        summary.matched_units,
        summary.online,
        summary.partial,
        summary.offline,
    );

    Ok(summary)
}
