use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::models::{Reservation, ShiftWindow};
use crate::schedule::parse_wall_time;

fn window_bounds(date: NaiveDate, window: &ShiftWindow) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = parse_wall_time(&window.start)?;
    let end = parse_wall_time(&window.end)?;
    Some((date.and_time(start), date.and_time(end)))
}

fn truncate_seconds(instant: NaiveDateTime) -> NaiveDateTime {
    instant
        .with_second(0)
        .and_then(|i| i.with_nanosecond(0))
        .unwrap_or(instant)
}

/// Start/end instants of every non-cancelled reservation whose
/// `[start, end)` intersects the day, seconds truncated. These keep the
/// grid aligned with real bookings even when one was created off-grid.
fn anchor_instants(date: NaiveDate, reservations: &[Reservation]) -> Vec<NaiveDateTime> {
    let day_start = date.and_hms_opt(0, 0, 0).expect("midnight always exists");
    let day_end = day_start + Duration::days(1);
    reservations
        .iter()
        .filter(|r| !r.is_cancelled())
        .filter(|r| r.start_time < day_end && r.end_time > day_start)
        .flat_map(|r| [truncate_seconds(r.start_time), truncate_seconds(r.end_time)])
        .collect()
}

/// Candidate slot starts for a day: `duration`-minute steps inside each
/// shift window, merged with reservation boundary anchors.
///
/// A base slot is only emitted when the full `duration` fits inside its
/// window — there is no partial trailing slot. Windows with unparsable
/// bounds are skipped. Output is deduplicated, ascending, and stable for
/// identical input.
pub fn generate_slots(
    date: NaiveDate,
    windows: &[ShiftWindow],
    duration_min: u32,
    reservations: &[Reservation],
) -> Vec<NaiveDateTime> {
    let step = Duration::minutes(i64::from(duration_min));
    let mut instants: BTreeSet<NaiveDateTime> = BTreeSet::new();

    for window in windows {
        let Some((start, end)) = window_bounds(date, window) else {
            continue;
        };
        let mut cursor = start;
        while cursor + step <= end {
            instants.insert(cursor);
            cursor += step;
        }
    }

    instants.extend(anchor_instants(date, reservations));
    instants.into_iter().collect()
}

/// Player-facing variant: keep only instants where a full `duration`
/// window fits inside some shift window. Filters out anchors taken from
/// reservations that butt against a shift boundary.
pub fn bookable_slots(
    date: NaiveDate,
    windows: &[ShiftWindow],
    duration_min: u32,
    reservations: &[Reservation],
) -> Vec<NaiveDateTime> {
    let step = Duration::minutes(i64::from(duration_min));
    let bounds: Vec<_> = windows
        .iter()
        .filter_map(|w| window_bounds(date, w))
        .collect();

    generate_slots(date, windows, duration_min, reservations)
        .into_iter()
        .filter(|slot| {
            bounds
                .iter()
                .any(|(start, end)| *slot >= *start && *slot + step <= *end)
        })
        .collect()
}
