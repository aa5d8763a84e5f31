use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use monitor_worker::JobAcceptance;

use crate::{body::parse_json_body, error::ApiResult, routes::AppState};

/// `POST /jobs`
///
/// The body is decoded before any backend traffic so a rejected request
/// leaves no trace on the lifecycle state.
pub async fn accept_jobs(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<(StatusCode, Json<JobAcceptance>)> {
    let body = parse_json_body(&headers, &body?)?;

    state.lifecycle.prepare_request(&headers, false).await;
    let acceptance = state.lifecycle.handle_jobs(body.as_ref()).await;

    Ok((StatusCode::ACCEPTED, Json(acceptance)))
}
