mod availability;
mod commands;
mod config;
mod models;
mod schedule;
mod slots;
mod store;
mod web;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use crate::schedule::parse_instant;

/// Padel court scheduler — day grids, conflict checks, and bookings
/// from a club configuration and a reservation file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print debug-level logs
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct DataFiles {
    /// Path to the club configuration file
    #[arg(short = 'c', long, default_value = "club.toml")]
    club: PathBuf,

    /// Path to the reservation store
    #[arg(short = 'r', long, default_value = "reservations.json")]
    reservations: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the full day grid with free courts per slot
    Grid {
        #[command(flatten)]
        files: DataFiles,

        /// Day to render (YYYY-MM-DD)
        #[arg(value_name = "DATE")]
        date: NaiveDate,

        /// Override "now" for past-slot marking (YYYY-MM-DD HH:MM)
        #[arg(long)]
        now: Option<String>,
    },

    /// Show bookable start times for a day (player view)
    Slots {
        #[command(flatten)]
        files: DataFiles,

        /// Day to list (YYYY-MM-DD)
        #[arg(value_name = "DATE")]
        date: NaiveDate,

        /// Override "now" for past-slot filtering (YYYY-MM-DD HH:MM)
        #[arg(long)]
        now: Option<String>,
    },

    /// Check a proposed reservation for conflicts (exit 1 on conflict)
    Check {
        #[command(flatten)]
        files: DataFiles,

        /// Court name or id
        #[arg(long)]
        court: String,

        /// Proposed start (YYYY-MM-DD HH:MM); end is start + club duration
        #[arg(long)]
        start: String,

        /// Reservation id to ignore (edit-in-place)
        #[arg(long)]
        exclude: Option<Uuid>,
    },

    /// List free courts at an instant
    Free {
        #[command(flatten)]
        files: DataFiles,

        /// Instant to probe (YYYY-MM-DD HH:MM)
        #[arg(long)]
        at: String,
    },

    /// Create a reservation (re-checks conflicts before writing)
    Book {
        #[command(flatten)]
        files: DataFiles,

        /// Court name or id; omit to auto-pick when exactly one is free
        #[arg(long)]
        court: Option<String>,

        /// Start time (YYYY-MM-DD HH:MM)
        #[arg(long)]
        start: String,

        /// Reservation type: booking, match or maintenance
        #[arg(long, default_value = "booking")]
        kind: String,

        /// Player name (repeatable)
        #[arg(long = "player")]
        players: Vec<String>,
    },

    /// Move a reservation to a new time and/or court
    Move {
        #[command(flatten)]
        files: DataFiles,

        /// Reservation id
        #[arg(long)]
        id: Uuid,

        /// New start time (YYYY-MM-DD HH:MM)
        #[arg(long)]
        start: String,

        /// New court name or id (defaults to the current court)
        #[arg(long)]
        court: Option<String>,
    },

    /// Soft-cancel a reservation (keeps history, frees the slot)
    Cancel {
        #[command(flatten)]
        files: DataFiles,

        /// Reservation id
        #[arg(long)]
        id: Uuid,
    },

    /// Start the JSON availability API
    Serve {
        #[command(flatten)]
        files: DataFiles,

        /// Listen address (e.g. "0.0.0.0:3000")
        #[arg(short = 'a', long, default_value = "0.0.0.0:3011")]
        addr: String,
    },
}

fn resolve_now(flag: &Option<String>) -> Result<NaiveDateTime> {
    match flag {
        Some(s) => parse_instant(s)
            .with_context(|| format!("Cannot parse --now '{}' (expected YYYY-MM-DD HH:MM)", s)),
        None => Ok(Local::now().naive_local()),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match &cli.command {
        Command::Grid { files, date, now } => {
            let club = config::load_club(&files.club)?;
            let reservations = store::load_reservations(&files.reservations)?;
            commands::run_grid(&club, &reservations, *date, resolve_now(now)?)?;
        }
        Command::Slots { files, date, now } => {
            let club = config::load_club(&files.club)?;
            let reservations = store::load_reservations(&files.reservations)?;
            commands::run_slots(&club, &reservations, *date, resolve_now(now)?)?;
        }
        Command::Check {
            files,
            court,
            start,
            exclude,
        } => {
            let club = config::load_club(&files.club)?;
            let reservations = store::load_reservations(&files.reservations)?;
            let conflict = commands::run_check(&club, &reservations, court, start, *exclude)?;
            if conflict {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Free { files, at } => {
            let club = config::load_club(&files.club)?;
            let reservations = store::load_reservations(&files.reservations)?;
            commands::run_free(&club, &reservations, at)?;
        }
        Command::Book {
            files,
            court,
            start,
            kind,
            players,
        } => {
            let club = config::load_club(&files.club)?;
            let mut reservations = store::load_reservations(&files.reservations)?;
            commands::run_book(
                &club,
                &mut reservations,
                &files.reservations,
                court.as_deref(),
                start,
                kind,
                players,
            )?;
        }
        Command::Move {
            files,
            id,
            start,
            court,
        } => {
            let club = config::load_club(&files.club)?;
            let mut reservations = store::load_reservations(&files.reservations)?;
            commands::run_move(
                &club,
                &mut reservations,
                &files.reservations,
                *id,
                start,
                court.as_deref(),
            )?;
        }
        Command::Cancel { files, id } => {
            let mut reservations = store::load_reservations(&files.reservations)?;
            commands::run_cancel(&mut reservations, &files.reservations, *id)?;
        }
        Command::Serve { files, addr } => {
            let club = config::load_club(&files.club)?;
            web::serve(club, files.reservations.clone(), addr).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
