use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use monitor_worker::WorkerLifecycle;

use crate::handlers::{
    health::health_check,
    jobs::accept_jobs,
    root::{not_found, root_handler},
    status::get_status,
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<WorkerLifecycle>,
}

/// 创建API路由
pub fn create_routes(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        // 任务接收
        .route("/jobs", post(accept_jobs))
        // 状态与健康检查
        .route("/status", get(get_status))
        .route("/healthz", get(health_check))
        // 路由清单（无副作用）
        .route("/", get(root_handler))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
