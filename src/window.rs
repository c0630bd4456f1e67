/// Active time-window resolution.
///
/// A UMM generation unit carries a list of capacity periods. At most one of
/// them drives the unit's state at a given instant: the first period, in
/// source order, that is complete and whose bounds contain the instant.
///
/// # Clock injection
/// Functions take `now: DateTime<Utc>` rather than calling `Utc::now()`
/// internally, so tests stay deterministic without mocking time.

use chrono::{DateTime, Utc};

use crate::model::{GenerationUnit, TimePeriod, UnitState};

/// Returns `true` if `now` lies within `[start, stop]`, both ends inclusive.
///
/// A period with a missing endpoint is never active.
pub fn is_active_at(period: &TimePeriod, now: DateTime<Utc>) -> bool {
    match (period.start, period.stop) {
        (Some(start), Some(stop)) => start <= now && now <= stop,
        _ => false,
    }
}

/// Resolves the capacity pair in effect for `unit` at `now`.
///
/// Returns the first active period that carries both capacities. Later
/// periods are not consulted even if they are also active. `None` means "no
/// active period", which is not the same as zero capacity.
pub fn resolve_active_period(unit: &GenerationUnit, now: DateTime<Utc>) -> Option<UnitState> {
    unit.time_periods
        .iter()
        .filter(|p| is_active_at(p, now))
        .find_map(|p| match (p.available_mw, p.unavailable_mw) {
            (Some(available_mw), Some(unavailable_mw)) => Some(UnitState {
                available_mw,
                unavailable_mw,
            }),
            _ => None,
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
