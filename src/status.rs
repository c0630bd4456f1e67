/// Per-unit state aggregation and status derivation.
///
/// Several messages may describe the same unit at once (a planned outage and
/// a later forced derate, say). The engine keeps one state per unit code:
/// the pair with the largest unavailable capacity. Both halves of the pair
/// always come from the same period.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::logging::{self, DataSource};
use crate::model::{AvailabilityStatus, UmmMessage, UnitState};
use crate::registry::Registry;
use crate::unit_code::extract_unit_code;
use crate::window::resolve_active_period;

/// Resolved state per unit code, built fresh for each run.
pub type StateMap = HashMap<String, UnitState>;

/// Walks every unit of every message and builds the merged state map.
///
/// Units whose name carries no GU code, or a code not in `registry`, are
/// skipped, as are units with no active period at `now`.
pub fn collect_unit_states(
    messages: &[UmmMessage],
    registry: &Registry,
    now: DateTime<Utc>,
) -> StateMap {
    let mut states = StateMap::new();

    for message in messages {
        for unit in &message.generation_units {
            let Some(code) = unit.name.as_deref().and_then(extract_unit_code) else {
                continue;
            };
            if !registry.contains(&code) {
                continue;
            }

            let Some(state) = resolve_active_period(unit, now) else {
                continue;
            };

            logging::debug(
                DataSource::Umm,
                Some(&code),
                &format!(
                    "active period: {} MW available, {} MW unavailable",
                    state.available_mw, state.unavailable_mw
                ),
            );

            merge_conservative(&mut states, code, state);
        }
    }

    states
}

/// Records `state` for `code`, keeping whichever pair has the larger
/// unavailable capacity. Ties keep the existing pair.
pub fn merge_conservative(states: &mut StateMap, code: String, state: UnitState) {
    states
        .entry(code)
        .and_modify(|current| {
            if state.unavailable_mw > current.unavailable_mw {
                *current = state;
            }
        })
        .or_insert(state);
}

/// Classifies a resolved state. Comparisons are exact.
pub fn derive_status(state: &UnitState) -> AvailabilityStatus {
    if state.unavailable_mw == 0.0 {
        AvailabilityStatus::Online
    } else if state.available_mw == 0.0 {
        AvailabilityStatus::Offline
    } else {
        AvailabilityStatus::Partial
    }
}

/// Final figures for one registry entry.
///
/// No recorded state means no active outage message, which reads as online
/// with both MW figures left at zero (installed capacity is not known here).
pub fn availability_for(state: Option<&UnitState>) -> (UnitState, AvailabilityStatus) {
    match state {
        Some(s) => (*s, derive_status(s)),
        None => (
            UnitState {
                available_mw: 0.0,
                unavailable_mw: 0.0,
            },
            AvailabilityStatus::Online,
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeneratorRecord, GenerationUnit, TimePeriod};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn registry_with(codes: &[&str]) -> Registry {
        let mut registry = Registry::new();
        for code in codes {
            registry.insert(GeneratorRecord {
                unit_code: code.to_string(),
                infrastructure: format!("Test {code}"),
                latitude: 53.0,
                longitude: -7.0,
                fuel: String::new(),
            });
        }
        registry
    }

    fn message(name: &str, start_hour: u32, stop_hour: u32, available: f64, unavailable: f64) -> UmmMessage {
        UmmMessage {
            generation_units: vec![GenerationUnit {
                name: Some(name.to_string()),
                time_periods: vec![TimePeriod {
                    start: Some(Utc.with_ymd_and_hms(2024, 5, 1, start_hour, 0, 0).unwrap()),
                    stop: Some(Utc.with_ymd_and_hms(2024, 5, 1, stop_hour, 0, 0).unwrap()),
                    available_mw: Some(available),
                    unavailable_mw: Some(unavailable),
                }],
            }],
        }
    }

    fn state(available_mw: f64, unavailable_mw: f64) -> UnitState {
        UnitState {
            available_mw,
            unavailable_mw,
        }
    }

    #[test]
    fn test_merge_keeps_larger_unavailable_with_its_own_available() {
        let registry = registry_with(&["GU_400850"]);
        let messages = vec![
            message("GU_400850", 0, 23, 150.0, 50.0),
            message("gu_400850 MP1", 6, 18, 120.0, 80.0),
        ];

        let states = collect_unit_states(&messages, &registry, fixed_now());
        assert_eq!(states.len(), 1);
        assert_eq!(states["GU_400850"], state(120.0, 80.0));
    }

    #[test]
    fn test_merge_order_does_not_matter_for_strictly_larger_value() {
        let registry = registry_with(&["GU_400850"]);
        let messages = vec![
            message("GU_400850", 6, 18, 120.0, 80.0),
            message("GU_400850", 0, 23, 150.0, 50.0),
        ];

        let states = collect_unit_states(&messages, &registry, fixed_now());
        assert_eq!(states["GU_400850"], state(120.0, 80.0));
    }

    #[test]
    fn test_merge_tie_keeps_first_pair() {
        let mut states = StateMap::new();
        merge_conservative(&mut states, "GU_1".to_string(), state(10.0, 40.0));
        merge_conservative(&mut states, "GU_1".to_string(), state(99.0, 40.0));
        assert_eq!(states["GU_1"], state(10.0, 40.0));
    }

    #[test]
    fn test_merge_compares_unrounded_values() {
        let mut states = StateMap::new();
        merge_conservative(&mut states, "GU_1".to_string(), state(10.0, 40.04));
        merge_conservative(&mut states, "GU_1".to_string(), state(20.0, 40.01));
        assert_eq!(states["GU_1"], state(10.0, 40.04));
    }

    #[test]
    fn test_units_outside_registry_or_without_code_are_ignored() {
        let registry = registry_with(&["GU_400850"]);
        let mut nameless = message("ignored", 0, 23, 0.0, 300.0);
        nameless.generation_units[0].name = None;

        let messages = vec![
            message("GU_999999", 0, 23, 0.0, 300.0),
            message("Moneypoint 1", 0, 23, 0.0, 300.0),
            nameless,
        ];

        let states = collect_unit_states(&messages, &registry, fixed_now());
        assert!(states.is_empty());
    }

    #[test]
    fn test_inactive_messages_contribute_nothing() {
        let registry = registry_with(&["GU_400850"]);
        let messages = vec![
            message("GU_400850", 0, 6, 0.0, 400.0),
            message("GU_400850", 10, 14, 300.0, 100.0),
        ];

        let states = collect_unit_states(&messages, &registry, fixed_now());
        assert_eq!(states["GU_400850"], state(300.0, 100.0));
    }

    #[test]
    fn test_status_derivation() {
        assert_eq!(derive_status(&state(200.0, 0.0)), AvailabilityStatus::Online);
        assert_eq!(derive_status(&state(0.0, 200.0)), AvailabilityStatus::Offline);
        assert_eq!(derive_status(&state(50.0, 50.0)), AvailabilityStatus::Partial);
        // Both zero: unavailable is checked first.
        assert_eq!(derive_status(&state(0.0, 0.0)), AvailabilityStatus::Online);
    }

    #[test]
    fn test_status_uses_exact_comparison() {
        assert_eq!(derive_status(&state(0.01, 100.0)), AvailabilityStatus::Partial);
        assert_eq!(derive_status(&state(100.0, 0.01)), AvailabilityStatus::Partial);
    }

    #[test]
    fn test_missing_state_defaults_to_online_with_zero_mw() {
        let (figures, status) = availability_for(None);
        assert_eq!(figures, state(0.0, 0.0));
        assert_eq!(status, AvailabilityStatus::Online);
    }
}
