use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Reservation;

/// Load the reservation store. A missing file is an empty store; a
/// present but unreadable one is an error. Rows come back sorted by
/// start time so downstream output is deterministic.
pub fn load_reservations(path: &Path) -> Result<Vec<Reservation>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()))
        }
    };
    let mut reservations: Vec<Reservation> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    reservations.sort_by_key(|r| r.start_time);
    Ok(reservations)
}

/// Whole-file rewrite; reservations are soft-cancelled, never dropped,
/// so the file keeps full history.
pub fn save_reservations(path: &Path, reservations: &[Reservation]) -> Result<()> {
    let json = serde_json::to_string_pretty(reservations)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReservationKind, ReservationStatus};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn sample(start_h: u32) -> Reservation {
        let start = NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(start_h, 0, 0)
            .unwrap();
        Reservation {
            id: Uuid::new_v4(),
            court_id: Uuid::new_v4(),
            start_time: start,
            end_time: start + chrono::Duration::minutes(90),
            status: ReservationStatus::Confirmed,
            kind: ReservationKind::Booking,
            user_id: None,
            players: vec![],
            items: vec![],
            price: 24.0,
        }
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let path = std::env::temp_dir().join("padel-scheduler-does-not-exist.json");
        let reservations = load_reservations(&path).unwrap();
        assert!(reservations.is_empty());
    }

    #[test]
    fn test_save_then_load_sorted() {
        let path = std::env::temp_dir().join(format!("padel-store-{}.json", Uuid::new_v4()));
        let rows = vec![sample(17), sample(9)];
        save_reservations(&path, &rows).unwrap();
        let loaded = load_reservations(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded[0].start_time < loaded[1].start_time);
        assert_eq!(loaded[1].id, rows[0].id);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("padel-store-{}.json", Uuid::new_v4()));
        std::fs::write(&path, "not json").unwrap();
        assert!(load_reservations(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
