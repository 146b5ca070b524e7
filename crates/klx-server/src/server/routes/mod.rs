//! API routes

pub mod files;
pub mod process;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
};

use crate::server::state::AppState;
use crate::server::status::JobStatus;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/process",
            post(process::process_files).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/status", get(status))
        .route("/template", get(files::download_template))
        .route("/download", get(files::download_result))
}

/// GET /api/status - Current job progress
async fn status(State(state): State<AppState>) -> Json<JobStatus> {
    Json(state.status())
}
