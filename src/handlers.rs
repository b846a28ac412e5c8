use crate::errors::AppError;
use crate::models::{Grid, ReportStatus, ReportView};
use crate::report::{build_report, run_report};
use crate::state::AppState;
use crate::ui::{render_error, render_report};
use axum::{Json, extract::State, http::StatusCode, response::Html};
use chrono::Local;
use tracing::error;

pub async fn index(State(state): State<AppState>) -> (StatusCode, Html<String>) {
    let view = current_report(&state).await;
    match render_report(&view) {
        Ok(html) => (StatusCode::OK, Html(html)),
        Err(err) => {
            error!("failed to render lead report: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_error("The lead report could not be displayed.")),
            )
        }
    }
}

pub async fn get_report(State(state): State<AppState>) -> Json<ReportView> {
    Json(current_report(&state).await)
}

/// Raw counts. Unlike the dashboard, a source that returned nothing at all
/// is reported as an upstream failure.
pub async fn get_grid(State(state): State<AppState>) -> Result<Json<Grid>, AppError> {
    let today = Local::now().date_naive();
    let (grid, view) = run_report(state.source.as_ref(), &state.config, today).await;
    match view.status {
        ReportStatus::Unavailable { error } => Err(AppError {
            status: StatusCode::BAD_GATEWAY,
            message: error,
        }),
        _ => Ok(Json(grid)),
    }
}

pub async fn healthz() -> &'static str {
    "ok"
}

async fn current_report(state: &AppState) -> ReportView {
    let today = Local::now().date_naive();
    build_report(state.source.as_ref(), &state.config, today).await
}
