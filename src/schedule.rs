use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{Club, ShiftWindow};

/// Weekday key used by club shift configuration: "1" (Monday) through
/// "7" (Sunday). Sunday is "7", never "0".
pub fn weekday_key(date: NaiveDate) -> String {
    date.weekday().number_from_monday().to_string()
}

/// Parse a wall-clock "HH:MM" string.
pub fn parse_wall_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

/// Parse a "YYYY-MM-DD HH:MM" instant, also accepting a "T" separator
/// and trailing ":SS".
pub fn parse_instant(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in [
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    None
}

/// Active open windows for a date.
///
/// Returns the configured shift list for that weekday verbatim when it is
/// present and non-empty; otherwise synthesizes a single fallback window
/// from the club's opening/closing hour. No validation happens here —
/// unparsable entries are discarded by the slot generator.
pub fn resolve_shifts_for_date(club: &Club, date: NaiveDate) -> Vec<ShiftWindow> {
    let key = weekday_key(date);
    if let Some(windows) = club.shifts.get(&key) {
        if !windows.is_empty() {
            return windows.clone();
        }
    }
    vec![ShiftWindow {
        start: format!("{:02}:00", club.opening_hour),
        end: format!("{:02}:00", club.closing_hour),
    }]
}
