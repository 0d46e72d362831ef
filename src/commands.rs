use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::availability::{classify_slot, free_courts_at, has_conflict, SlotAvailability};
use crate::config::ClubFile;
use crate::models::{
    Court, Player, Reservation, ReservationKind, ReservationStatus,
};
use crate::schedule::{parse_instant, resolve_shifts_for_date};
use crate::slots::{bookable_slots, generate_slots};
use crate::store;

/// Look a court up by id or (case-insensitive) name.
fn find_court<'a>(courts: &'a [Court], key: &str) -> Result<&'a Court> {
    if let Ok(id) = key.parse::<Uuid>() {
        if let Some(court) = courts.iter().find(|c| c.id == id) {
            return Ok(court);
        }
    }
    courts
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(key.trim()))
        .ok_or_else(|| anyhow::anyhow!("No court named '{}' in club config", key))
}

fn parse_start(s: &str) -> Result<NaiveDateTime> {
    parse_instant(s)
        .ok_or_else(|| anyhow::anyhow!("Cannot parse '{}' (expected YYYY-MM-DD HH:MM)", s))
}

fn parse_kind(s: &str) -> Result<ReservationKind> {
    match s.trim().to_lowercase().as_str() {
        "booking" => Ok(ReservationKind::Booking),
        "match" => Ok(ReservationKind::Match),
        "maintenance" => Ok(ReservationKind::Maintenance),
        other => bail!("Unknown reservation type '{}' (booking, match, maintenance)", other),
    }
}

fn court_name(courts: &[Court], id: Uuid) -> String {
    courts
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| id.to_string())
}

/// Staff view: every grid row for the day with the courts still free on
/// it. Rows before `now` are marked rather than hidden so the day stays
/// readable next to its bookings.
pub fn run_grid(
    club_file: &ClubFile,
    reservations: &[Reservation],
    date: NaiveDate,
    now: NaiveDateTime,
) -> Result<()> {
    let club = &club_file.club;
    let windows = resolve_shifts_for_date(club, date);
    let slots = generate_slots(date, &windows, club.duration, reservations);

    if slots.is_empty() {
        warn!("No slots for {} — check the club's shift configuration", date);
        return Ok(());
    }

    println!("{} — {} ({} min slots)", club.name, date, club.duration);
    for slot in slots {
        let label = match classify_slot(&club_file.courts, reservations, slot, club.duration) {
            SlotAvailability::Full => "full".to_string(),
            SlotAvailability::Single(court) => format!("{} (one-tap)", court.name),
            SlotAvailability::Choice(courts) => courts
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        };
        let past = if slot < now { "  (past)" } else { "" };
        println!("  {}  {}{}", slot.format("%H:%M"), label, past);
    }
    Ok(())
}

/// Player view: bookable start times only — strict shift fit, past
/// slots dropped, full slots dropped.
pub fn run_slots(
    club_file: &ClubFile,
    reservations: &[Reservation],
    date: NaiveDate,
    now: NaiveDateTime,
) -> Result<()> {
    let club = &club_file.club;
    let windows = resolve_shifts_for_date(club, date);
    let slots = bookable_slots(date, &windows, club.duration, reservations);

    let mut shown = 0;
    for slot in slots {
        if slot < now {
            continue;
        }
        let free = free_courts_at(&club_file.courts, reservations, slot, club.duration);
        if free.is_empty() {
            continue;
        }
        println!(
            "  {}  {} court{} free",
            slot.format("%H:%M"),
            free.len(),
            if free.len() == 1 { "" } else { "s" }
        );
        shown += 1;
    }
    if shown == 0 {
        println!("No bookable slots on {}", date);
    }
    Ok(())
}

/// Conflict pre-check for a proposed interval. Returns whether a
/// conflict exists so the caller can set the exit code.
pub fn run_check(
    club_file: &ClubFile,
    reservations: &[Reservation],
    court_key: &str,
    start_str: &str,
    exclude: Option<Uuid>,
) -> Result<bool> {
    let club = &club_file.club;
    let court = find_court(&club_file.courts, court_key)?;
    let start = parse_start(start_str)?;
    let end = start + Duration::minutes(i64::from(club.duration));

    let conflict = has_conflict(reservations, court.id, start, club.duration, exclude);
    if conflict {
        println!(
            "CONFLICT: {} {} – {} overlaps an existing reservation",
            court.name,
            start.format("%Y-%m-%d %H:%M"),
            end.format("%H:%M")
        );
    } else {
        println!(
            "free: {} {} – {}",
            court.name,
            start.format("%Y-%m-%d %H:%M"),
            end.format("%H:%M")
        );
    }
    Ok(conflict)
}

pub fn run_free(club_file: &ClubFile, reservations: &[Reservation], at_str: &str) -> Result<()> {
    let club = &club_file.club;
    let at = parse_start(at_str)?;
    match classify_slot(&club_file.courts, reservations, at, club.duration) {
        SlotAvailability::Full => println!("{}: full", at.format("%Y-%m-%d %H:%M")),
        SlotAvailability::Single(court) => println!(
            "{}: {} free (one-tap booking)",
            at.format("%Y-%m-%d %H:%M"),
            court.name
        ),
        SlotAvailability::Choice(courts) => {
            println!("{}: choose a court:", at.format("%Y-%m-%d %H:%M"));
            for court in courts {
                println!("  {}  {:.2}", court.name, court.effective_price(club));
            }
        }
    }
    Ok(())
}

/// Create a reservation after a final conflict re-check. With no
/// `--court`, books directly only when exactly one court is free.
#[allow(clippy::too_many_arguments)]
pub fn run_book(
    club_file: &ClubFile,
    reservations: &mut Vec<Reservation>,
    store_path: &Path,
    court_key: Option<&str>,
    start_str: &str,
    kind_str: &str,
    player_names: &[String],
) -> Result<()> {
    let club = &club_file.club;
    let start = parse_start(start_str)?;
    let kind = parse_kind(kind_str)?;

    let court = match court_key {
        Some(key) => {
            let court = find_court(&club_file.courts, key)?;
            if !court.is_active {
                bail!("{} is not active", court.name);
            }
            court
        }
        None => match classify_slot(&club_file.courts, reservations, start, club.duration) {
            SlotAvailability::Single(court) => {
                info!("Only {} is free — booking it", court.name);
                court
            }
            SlotAvailability::Choice(courts) => {
                let names: Vec<_> = courts.iter().map(|c| c.name.as_str()).collect();
                bail!(
                    "Several courts free ({}); pick one with --court",
                    names.join(", ")
                );
            }
            SlotAvailability::Full => bail!("No court free at {}", start.format("%H:%M")),
        },
    };

    if has_conflict(reservations, court.id, start, club.duration, None) {
        bail!(
            "Time slot already booked: {} at {}",
            court.name,
            start.format("%Y-%m-%d %H:%M")
        );
    }

    let reservation = Reservation {
        id: Uuid::new_v4(),
        court_id: court.id,
        start_time: start,
        end_time: start + Duration::minutes(i64::from(club.duration)),
        status: ReservationStatus::Confirmed,
        kind,
        user_id: None,
        players: player_names
            .iter()
            .map(|name| Player {
                name: name.clone(),
                paid: false,
                share: None,
            })
            .collect(),
        items: vec![],
        price: court.effective_price(club),
    };

    println!(
        "Booked {} {} – {} ({:.2})",
        court.name,
        reservation.start_time.format("%Y-%m-%d %H:%M"),
        reservation.end_time.format("%H:%M"),
        reservation.price
    );
    reservations.push(reservation);
    store::save_reservations(store_path, reservations)
        .context("Booking computed but could not be saved")?;
    Ok(())
}

/// Edit-in-place: re-run the conflict check with the reservation itself
/// excluded, then rewrite its interval (and court, if given).
pub fn run_move(
    club_file: &ClubFile,
    reservations: &mut Vec<Reservation>,
    store_path: &Path,
    id: Uuid,
    start_str: &str,
    court_key: Option<&str>,
) -> Result<()> {
    let club = &club_file.club;
    let start = parse_start(start_str)?;

    let Some(index) = reservations.iter().position(|r| r.id == id) else {
        bail!("No reservation {}", id);
    };
    if reservations[index].is_cancelled() {
        bail!("Reservation {} is cancelled; book a new one instead", id);
    }

    let court_id = match court_key {
        Some(key) => {
            let court = find_court(&club_file.courts, key)?;
            if !court.is_active {
                bail!("{} is not active", court.name);
            }
            court.id
        }
        None => reservations[index].court_id,
    };

    if has_conflict(reservations, court_id, start, club.duration, Some(id)) {
        bail!(
            "Time slot already booked: {} at {}",
            court_name(&club_file.courts, court_id),
            start.format("%Y-%m-%d %H:%M")
        );
    }

    let reservation = &mut reservations[index];
    reservation.court_id = court_id;
    reservation.start_time = start;
    reservation.end_time = start + Duration::minutes(i64::from(club.duration));
    println!(
        "Moved reservation to {} {} – {}",
        court_name(&club_file.courts, court_id),
        start.format("%Y-%m-%d %H:%M"),
        reservation.end_time.format("%H:%M")
    );
    store::save_reservations(store_path, reservations)
        .context("Move computed but could not be saved")?;
    Ok(())
}

/// Soft cancel. Idempotent: cancelling an already-cancelled reservation
/// just reports it.
pub fn run_cancel(
    reservations: &mut Vec<Reservation>,
    store_path: &Path,
    id: Uuid,
) -> Result<()> {
    let Some(reservation) = reservations.iter_mut().find(|r| r.id == id) else {
        bail!("No reservation {}", id);
    };
    if reservation.is_cancelled() {
        info!("Reservation {} was already cancelled", id);
        return Ok(());
    }
    reservation.cancel();
    println!(
        "Cancelled reservation {} ({} at {})",
        id,
        reservation.court_id,
        reservation.start_time.format("%Y-%m-%d %H:%M")
    );
    store::save_reservations(store_path, reservations)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn club_file() -> ClubFile {
        ClubFile {
            club: crate::models::Club {
                name: "Padel Nord".into(),
                shifts: HashMap::new(),
                opening_hour: 8,
                closing_hour: 22,
                duration: 90,
                default_price: 24.0,
            },
            courts: vec![
                Court {
                    id: Uuid::new_v4(),
                    name: "Court A".into(),
                    price: Some(30.0),
                    is_active: true,
                },
                Court {
                    id: Uuid::new_v4(),
                    name: "Court B".into(),
                    price: None,
                    is_active: true,
                },
            ],
        }
    }

    fn temp_store() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("padel-cmd-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn test_find_court_by_name_case_insensitive() {
        let file = club_file();
        assert_eq!(find_court(&file.courts, "court a").unwrap().name, "Court A");
        assert!(find_court(&file.courts, "Court C").is_err());
    }

    #[test]
    fn test_find_court_by_id() {
        let file = club_file();
        let id = file.courts[1].id.to_string();
        assert_eq!(find_court(&file.courts, &id).unwrap().name, "Court B");
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("match").unwrap(), ReservationKind::Match);
        assert_eq!(parse_kind("Booking").unwrap(), ReservationKind::Booking);
        assert!(parse_kind("party").is_err());
    }

    #[test]
    fn test_book_then_double_book_rejected() {
        let file = club_file();
        let path = temp_store();
        let mut reservations = Vec::new();

        run_book(
            &file,
            &mut reservations,
            &path,
            Some("Court A"),
            "2024-06-03 09:00",
            "booking",
            &["ana".into()],
        )
        .unwrap();
        assert_eq!(reservations.len(), 1);
        assert_eq!(reservations[0].price, 30.0);
        assert_eq!(reservations[0].players.len(), 1);

        // Overlapping second booking on the same court must fail.
        let err = run_book(
            &file,
            &mut reservations,
            &path,
            Some("Court A"),
            "2024-06-03 10:00",
            "booking",
            &[],
        )
        .unwrap_err();
        assert!(err.to_string().contains("already booked"));

        // Same interval on the other court is fine.
        run_book(
            &file,
            &mut reservations,
            &path,
            Some("Court B"),
            "2024-06-03 09:00",
            "booking",
            &[],
        )
        .unwrap();
        assert_eq!(reservations.len(), 2);
        assert_eq!(reservations[1].price, 24.0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_auto_book_requires_single_free_court() {
        let file = club_file();
        let path = temp_store();
        let mut reservations = Vec::new();

        // Both courts free: must ask for a choice.
        let err = run_book(
            &file,
            &mut reservations,
            &path,
            None,
            "2024-06-03 09:00",
            "booking",
            &[],
        )
        .unwrap_err();
        assert!(err.to_string().contains("--court"));

        // Occupy Court A; auto-book should land on Court B.
        run_book(
            &file,
            &mut reservations,
            &path,
            Some("Court A"),
            "2024-06-03 09:00",
            "booking",
            &[],
        )
        .unwrap();
        run_book(
            &file,
            &mut reservations,
            &path,
            None,
            "2024-06-03 09:00",
            "booking",
            &[],
        )
        .unwrap();
        assert_eq!(reservations[1].court_id, file.courts[1].id);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_move_excludes_itself_from_conflict() {
        let file = club_file();
        let path = temp_store();
        let mut reservations = Vec::new();
        run_book(
            &file,
            &mut reservations,
            &path,
            Some("Court A"),
            "2024-06-03 09:00",
            "booking",
            &[],
        )
        .unwrap();
        let id = reservations[0].id;

        // Nudging a reservation within its own interval must not
        // conflict with itself.
        run_move(&file, &mut reservations, &path, id, "2024-06-03 09:30", None).unwrap();
        assert_eq!(
            reservations[0].start_time,
            parse_instant("2024-06-03 09:30").unwrap()
        );
        assert_eq!(
            reservations[0].end_time,
            parse_instant("2024-06-03 11:00").unwrap()
        );
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_cancel_frees_slot_for_rebooking() {
        let file = club_file();
        let path = temp_store();
        let mut reservations = Vec::new();
        run_book(
            &file,
            &mut reservations,
            &path,
            Some("Court A"),
            "2024-06-03 09:00",
            "booking",
            &[],
        )
        .unwrap();
        let id = reservations[0].id;

        run_cancel(&mut reservations, &path, id).unwrap();
        // Idempotent second cancel.
        run_cancel(&mut reservations, &path, id).unwrap();
        // History kept, slot free again.
        assert_eq!(reservations.len(), 1);
        run_book(
            &file,
            &mut reservations,
            &path,
            Some("Court A"),
            "2024-06-03 09:00",
            "booking",
            &[],
        )
        .unwrap();
        assert_eq!(reservations.len(), 2);
        std::fs::remove_file(&path).ok();
    }
}
