use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/report", get(handlers::get_report))
        .route("/api/grid", get(handlers::get_grid))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
