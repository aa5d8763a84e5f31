use axum::{extract::State, Json};
use monitor_worker::RouteListing;

use crate::{error::ApiError, routes::AppState};

/// `GET /`. Never touches the backend.
pub async fn root_handler(State(state): State<AppState>) -> Json<RouteListing> {
    Json(state.lifecycle.route_listing())
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
