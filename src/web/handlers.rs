use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiError;
use super::AppState;
use crate::availability::{classify_slot, has_conflict, SlotAvailability};
use crate::models::{Player, Reservation, ReservationKind, ReservationStatus};
use crate::schedule::{parse_instant, resolve_shifts_for_date};
use crate::slots::generate_slots;

fn parse_date(s: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("cannot parse date '{}'", s)))
}

fn parse_start(s: &str) -> Result<NaiveDateTime, ApiError> {
    parse_instant(s)
        .ok_or_else(|| ApiError::BadRequest(format!("cannot parse instant '{}'", s)))
}

#[derive(Deserialize)]
pub(crate) struct GridQuery {
    date: String,
    /// Injected "now" for past-slot marking; defaults to the wall clock.
    now: Option<String>,
}

#[derive(Serialize)]
struct GridRow {
    time: NaiveDateTime,
    status: &'static str,
    courts: Vec<String>,
    past: bool,
}

#[derive(Serialize)]
pub(crate) struct GridResponse {
    club: String,
    date: NaiveDate,
    duration: u32,
    rows: Vec<GridRow>,
}

pub(crate) async fn day_grid(
    State(state): State<AppState>,
    Query(query): Query<GridQuery>,
) -> Result<Json<GridResponse>, ApiError> {
    let date = parse_date(&query.date)?;
    let now = match &query.now {
        Some(s) => parse_start(s)?,
        None => Local::now().naive_local(),
    };
    let club = &state.club.club;
    let reservations = state.reservations.lock().unwrap();

    let windows = resolve_shifts_for_date(club, date);
    let rows = generate_slots(date, &windows, club.duration, &reservations)
        .into_iter()
        .map(|slot| {
            let (status, courts) =
                match classify_slot(&state.club.courts, &reservations, slot, club.duration) {
                    SlotAvailability::Full => ("full", vec![]),
                    SlotAvailability::Single(c) => ("single", vec![c.name.clone()]),
                    SlotAvailability::Choice(cs) => {
                        ("choice", cs.iter().map(|c| c.name.clone()).collect())
                    }
                };
            GridRow {
                time: slot,
                status,
                courts,
                past: slot < now,
            }
        })
        .collect();

    Ok(Json(GridResponse {
        club: club.name.clone(),
        date,
        duration: club.duration,
        rows,
    }))
}

#[derive(Deserialize)]
pub(crate) struct FreeQuery {
    at: String,
}

#[derive(Serialize)]
struct FreeCourt {
    id: Uuid,
    name: String,
    price: f64,
}

#[derive(Serialize)]
pub(crate) struct FreeResponse {
    at: NaiveDateTime,
    status: &'static str,
    courts: Vec<FreeCourt>,
}

pub(crate) async fn free_courts(
    State(state): State<AppState>,
    Query(query): Query<FreeQuery>,
) -> Result<Json<FreeResponse>, ApiError> {
    let at = parse_start(&query.at)?;
    let club = &state.club.club;
    let reservations = state.reservations.lock().unwrap();

    let (status, courts) = match classify_slot(&state.club.courts, &reservations, at, club.duration)
    {
        SlotAvailability::Full => ("full", vec![]),
        SlotAvailability::Single(c) => ("single", vec![c]),
        SlotAvailability::Choice(cs) => ("choice", cs),
    };
    let courts = courts
        .into_iter()
        .map(|c| FreeCourt {
            id: c.id,
            name: c.name.clone(),
            price: c.effective_price(club),
        })
        .collect();

    Ok(Json(FreeResponse { at, status, courts }))
}

#[derive(Deserialize)]
pub(crate) struct CheckRequest {
    court_id: Uuid,
    start: String,
    #[serde(default)]
    exclude: Option<Uuid>,
}

#[derive(Serialize)]
pub(crate) struct CheckResponse {
    conflict: bool,
}

pub(crate) async fn check_conflict(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, ApiError> {
    let start = parse_start(&req.start)?;
    let club = &state.club.club;
    let reservations = state.reservations.lock().unwrap();
    let conflict = has_conflict(&reservations, req.court_id, start, club.duration, req.exclude);
    Ok(Json(CheckResponse { conflict }))
}

#[derive(Deserialize)]
pub(crate) struct CreateRequest {
    court_id: Uuid,
    start: String,
    #[serde(default = "default_kind", rename = "type")]
    kind: ReservationKind,
    #[serde(default)]
    user_id: Option<Uuid>,
    #[serde(default)]
    players: Vec<String>,
}

fn default_kind() -> ReservationKind {
    ReservationKind::Booking
}

pub(crate) async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    let start = parse_start(&req.start)?;
    let club = &state.club.club;
    let court = state
        .club
        .courts
        .iter()
        .find(|c| c.id == req.court_id)
        .ok_or_else(|| ApiError::NotFound(format!("court {}", req.court_id)))?;
    if !court.is_active {
        return Err(ApiError::BadRequest(format!("{} is not active", court.name)));
    }

    let mut reservations = state.reservations.lock().unwrap();
    if has_conflict(&reservations, court.id, start, club.duration, None) {
        return Err(ApiError::Conflict(format!(
            "{} is already booked at {}",
            court.name,
            start.format("%Y-%m-%d %H:%M")
        )));
    }

    let reservation = Reservation {
        id: Uuid::new_v4(),
        court_id: court.id,
        start_time: start,
        end_time: start + Duration::minutes(i64::from(club.duration)),
        status: ReservationStatus::Confirmed,
        kind: req.kind,
        user_id: req.user_id,
        players: req
            .players
            .into_iter()
            .map(|name| Player {
                name,
                paid: false,
                share: None,
            })
            .collect(),
        items: vec![],
        price: court.effective_price(club),
    };
    reservations.push(reservation.clone());
    crate::store::save_reservations(&state.store_path, &reservations)?;

    Ok((StatusCode::CREATED, Json(reservation)))
}

pub(crate) async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, ApiError> {
    let mut reservations = state.reservations.lock().unwrap();
    let Some(reservation) = reservations.iter_mut().find(|r| r.id == id) else {
        return Err(ApiError::NotFound(format!("reservation {}", id)));
    };
    // Idempotent soft cancel.
    reservation.cancel();
    let snapshot = reservation.clone();
    crate::store::save_reservations(&state.store_path, &reservations)?;
    Ok(Json(snapshot))
}
