//! Socket-level transport.
//!
//! `RawHttpServer` serves HTTP/1.1 straight off a [`TcpListener`] with hyper
//! and dispatches on `(method, path)` itself. It shares decoding, error
//! shapes and every worker operation with the axum router.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::FutureExt;
use http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use monitor_worker::WorkerLifecycle;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::body::parse_json_body;
use crate::error::{ApiError, ApiResult};
use crate::middleware::panic_message;

type RawResponse = Response<Full<Bytes>>;

pub struct RawHttpServer {
    listener: TcpListener,
    lifecycle: Arc<WorkerLifecycle>,
    max_body_bytes: usize,
}

impl RawHttpServer {
    pub fn new(listener: TcpListener, lifecycle: Arc<WorkerLifecycle>, max_body_bytes: usize) -> Self {
        Self {
            listener,
            lifecycle,
            max_body_bytes,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` resolves. Connections already
    /// accepted finish on their own tasks.
    pub async fn serve<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);
        info!(addr = ?self.listener.local_addr().ok(), "Raw HTTP server listening");

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer_addr) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            error!(error = %e, "accept failed");
                            continue;
                        }
                    };
                    let lifecycle = Arc::clone(&self.lifecycle);
                    let max_body_bytes = self.max_body_bytes;

                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        let svc = service_fn(move |req: Request<Incoming>| {
                            let lifecycle = Arc::clone(&lifecycle);
                            async move {
                                Ok::<_, Infallible>(handle(lifecycle, max_body_bytes, req).await)
                            }
                        });

                        if let Err(e) = http1::Builder::new().serve_connection(io, svc).await {
                            debug!(%peer_addr, error = %e, "connection error");
                        }
                    });
                }
                _ = &mut shutdown => {
                    info!("Raw HTTP server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn handle(
    lifecycle: Arc<WorkerLifecycle>,
    max_body_bytes: usize,
    req: Request<Incoming>,
) -> RawResponse {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let outcome = AssertUnwindSafe(route(&lifecycle, max_body_bytes, req))
        .catch_unwind()
        .await;
    let response = match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => error_response(&e),
        Err(panic) => error_response(&ApiError::internal(panic_message(panic.as_ref()))),
    };

    info!(
        "完成请求处理: {} {} - 状态: {} - 耗时: {:?}",
        method,
        uri,
        response.status(),
        start.elapsed()
    );
    response
}

async fn route(
    lifecycle: &WorkerLifecycle,
    max_body_bytes: usize,
    req: Request<Incoming>,
) -> ApiResult<RawResponse> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (&method, path.as_str()) {
        (&Method::POST, "/jobs") => {
            let (parts, body) = req.into_parts();
            let bytes = read_body(body, max_body_bytes).await?;
            let body = parse_json_body(&parts.headers, &bytes)?;

            lifecycle.prepare_request(&parts.headers, false).await;
            let acceptance = lifecycle.handle_jobs(body.as_ref()).await;
            json_response(StatusCode::ACCEPTED, &acceptance)
        }
        (&Method::GET, "/status") => {
            lifecycle.prepare_request(req.headers(), false).await;
            json_response(StatusCode::OK, &lifecycle.status_report().await)
        }
        (&Method::GET, "/healthz") => {
            lifecycle.prepare_request(req.headers(), false).await;
            json_response(StatusCode::OK, &lifecycle.health())
        }
        (&Method::GET, "/") => json_response(StatusCode::OK, &lifecycle.route_listing()),
        _ => Err(ApiError::NotFound),
    }
}

async fn read_body(body: Incoming, max_body_bytes: usize) -> ApiResult<Bytes> {
    match Limited::new(body, max_body_bytes).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(ApiError::PayloadTooLarge),
        Err(e) => Err(ApiError::BadRequest(format!("Failed to read request body: {e}"))),
    }
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> ApiResult<RawResponse> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| ApiError::internal(format!("Failed to encode response: {e}")))?;
    Ok(build_response(status, bytes))
}

fn error_response(error: &ApiError) -> RawResponse {
    let status = error.status_code();
    if status.is_server_error() {
        error!("Request failed: {}", error);
    }
    build_response(status, error.body().to_string().into_bytes())
}

fn build_response(status: StatusCode, body: Vec<u8>) -> RawResponse {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
