use axum::{extract::State, http::HeaderMap, Json};
use monitor_worker::StatusReport;

use crate::routes::AppState;

/// `GET /status`
pub async fn get_status(State(state): State<AppState>, headers: HeaderMap) -> Json<StatusReport> {
    state.lifecycle.prepare_request(&headers, false).await;
    Json(state.lifecycle.status_report().await)
}
