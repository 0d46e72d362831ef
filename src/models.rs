use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single open window within a day, as configured ("HH:MM" wall clock).
/// Kept as raw strings; parsing happens in the slot generator, which skips
/// entries it cannot parse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ShiftWindow {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Club {
    pub name: String,
    /// Weekday key "1" (Monday) through "7" (Sunday) to open windows.
    /// Windows within a day need not be contiguous or non-overlapping.
    #[serde(default)]
    pub shifts: HashMap<String, Vec<ShiftWindow>>,
    /// Fallback opening/closing hour for weekdays without a shift list.
    pub opening_hour: u32,
    pub closing_hour: u32,
    /// Minutes per slot, club-wide.
    pub duration: u32,
    pub default_price: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Court {
    pub id: Uuid,
    pub name: String,
    /// Per-court price override; falls back to the club default.
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Court {
    pub fn effective_price(&self, club: &Club) -> f64 {
        self.price.unwrap_or(club.default_price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationKind {
    Booking,
    Match,
    Maintenance,
}

/// Derived from the players' paid flags, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Completed,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub paid: bool,
    /// This player's share of the price, if split unevenly.
    #[serde(default)]
    pub share: Option<f64>,
}

/// A purchased extra, optionally assigned to one player.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineItem {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub player: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Reservation {
    pub id: Uuid,
    pub court_id: Uuid,
    pub start_time: NaiveDateTime,
    /// Always `start_time + club.duration` when created through this tool;
    /// imported data may carry off-grid intervals, which the slot generator
    /// surfaces as anchor rows.
    pub end_time: NaiveDateTime,
    pub status: ReservationStatus,
    #[serde(rename = "type")]
    pub kind: ReservationKind,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    pub price: f64,
}

impl Reservation {
    pub fn is_cancelled(&self) -> bool {
        self.status == ReservationStatus::Cancelled
    }

    /// Soft cancel: frees the slot but keeps the row for history.
    /// Idempotent — cancelling twice is a no-op.
    pub fn cancel(&mut self) {
        self.status = ReservationStatus::Cancelled;
    }

    pub fn payment_status(&self) -> PaymentStatus {
        let paid = self.players.iter().filter(|p| p.paid).count();
        if paid == 0 {
            PaymentStatus::Pending
        } else if paid == self.players.len() {
            PaymentStatus::Completed
        } else {
            PaymentStatus::Partial
        }
    }
}
