pub mod error;
pub mod handlers;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ClubFile;
use crate::models::Reservation;
use crate::store;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) club: Arc<ClubFile>,
    /// Single in-process writer; the conflict check stays advisory for
    /// any deployment with more than one writer (see DESIGN.md).
    pub(crate) reservations: Arc<Mutex<Vec<Reservation>>>,
    pub(crate) store_path: Arc<PathBuf>,
}

pub async fn serve(club: ClubFile, store_path: PathBuf, addr: &str) -> Result<()> {
    let reservations = store::load_reservations(&store_path)?;
    info!(
        "Loaded {} reservations from {}",
        reservations.len(),
        store_path.display()
    );
    let state = AppState {
        club: Arc::new(club),
        reservations: Arc::new(Mutex::new(reservations)),
        store_path: Arc::new(store_path),
    };

    let app = Router::new()
        .route("/grid", get(handlers::day_grid))
        .route("/free", get(handlers::free_courts))
        .route("/check", post(handlers::check_conflict))
        .route("/reservations", post(handlers::create_reservation))
        .route("/reservations/{id}/cancel", post(handlers::cancel_reservation))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(addr).await?;
    info!("Availability API listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
