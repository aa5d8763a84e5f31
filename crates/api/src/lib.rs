//! # Monitor API
//!
//! HTTP surface of the monitoring worker. The same [`WorkerLifecycle`]
//! operations are reachable through two transports:
//!
//! - [`create_app`]: an axum [`Router`] with request logging, tracing and
//!   panic recovery layered on top
//! - [`RawHttpServer`]: a bare hyper HTTP/1.1 server that routes on
//!   `(method, path)` by hand
//!
//! ## Routes
//!
//! | Method | Path | Status | Side effects |
//! |---|---|---|---|
//! | `POST` | `/jobs` | 202 | registration + heartbeat, counts jobs |
//! | `GET` | `/status` | 200 | registration + heartbeat |
//! | `GET` | `/healthz` | 200 | registration + heartbeat |
//! | `GET` | `/` | 200 | none |
//!
//! Every error leaves the worker as `{"error": "<message>"}`.
//!
//! ```rust,ignore
//! use monitor_api::create_app;
//!
//! let lifecycle = Arc::new(WorkerLifecycle::from_config(&config)?);
//! let app = create_app(lifecycle, &config.server);
//! let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod body;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod raw;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use monitor_config::ServerConfig;
use monitor_worker::WorkerLifecycle;
use tower::ServiceBuilder;

pub use error::{ApiError, ApiResult};
pub use raw::RawHttpServer;
pub use routes::{create_routes, AppState};

use middleware::{panic_layer, request_logging, trace_layer};

/// Builds the complete axum application for one worker.
pub fn create_app(lifecycle: Arc<WorkerLifecycle>, server: &ServerConfig) -> Router {
    let state = AppState { lifecycle };

    create_routes(state, server.max_body_bytes).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(panic_layer())
            .layer(axum::middleware::from_fn(request_logging)),
    )
}
