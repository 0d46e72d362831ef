use chrono::{Duration, NaiveDateTime};
use uuid::Uuid;

use crate::models::{Court, Reservation};

/// Half-open interval overlap: `[s1, e1)` and `[s2, e2)`.
fn overlaps(s1: NaiveDateTime, e1: NaiveDateTime, s2: NaiveDateTime, e2: NaiveDateTime) -> bool {
    s1 < e2 && e1 > s2
}

/// Whether a proposed `[start, start + duration)` interval on a court
/// overlaps any existing reservation on that court.
///
/// Cancelled reservations are skipped here — callers may pass the raw
/// reservation set. `exclude` skips one reservation id so an in-place
/// edit does not conflict with itself. Any overlap is a hard conflict;
/// there is no buffer requirement between consecutive reservations.
pub fn has_conflict(
    reservations: &[Reservation],
    court_id: Uuid,
    start: NaiveDateTime,
    duration_min: u32,
    exclude: Option<Uuid>,
) -> bool {
    let end = start + Duration::minutes(i64::from(duration_min));
    reservations.iter().any(|r| {
        r.court_id == court_id
            && !r.is_cancelled()
            && exclude != Some(r.id)
            && overlaps(start, end, r.start_time, r.end_time)
    })
}

/// Active courts with no overlapping reservation for a `duration`-minute
/// window starting at `at`.
pub fn free_courts_at<'a>(
    courts: &'a [Court],
    reservations: &[Reservation],
    at: NaiveDateTime,
    duration_min: u32,
) -> Vec<&'a Court> {
    courts
        .iter()
        .filter(|c| c.is_active)
        .filter(|c| !has_conflict(reservations, c.id, at, duration_min, None))
        .collect()
}

/// How a slot should be offered to the user.
#[derive(Debug, PartialEq)]
pub enum SlotAvailability<'a> {
    /// No court free — render the slot as full, non-interactive.
    Full,
    /// Exactly one court free — one-tap booking.
    Single(&'a Court),
    /// Several courts free — the caller must prompt for a court.
    Choice(Vec<&'a Court>),
}

pub fn classify_slot<'a>(
    courts: &'a [Court],
    reservations: &[Reservation],
    at: NaiveDateTime,
    duration_min: u32,
) -> SlotAvailability<'a> {
    let mut free = free_courts_at(courts, reservations, at, duration_min);
    match free.len() {
        0 => SlotAvailability::Full,
        1 => SlotAvailability::Single(free.remove(0)),
        _ => SlotAvailability::Choice(free),
    }
}
