use axum::{extract::State, http::HeaderMap, Json};
use monitor_worker::HealthReport;

use crate::routes::AppState;

/// `GET /healthz`. Liveness only: backend outages still answer `ok`.
pub async fn health_check(State(state): State<AppState>, headers: HeaderMap) -> Json<HealthReport> {
    state.lifecycle.prepare_request(&headers, false).await;
    Json(state.lifecycle.health())
}
