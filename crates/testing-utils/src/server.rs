//! A real HTTP monitoring backend bound to an ephemeral local port

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use tokio::task::JoinHandle;

#[derive(Debug)]
struct Recorded {
    registrations: Vec<Value>,
    heartbeats: Vec<Value>,
    register_status: u16,
    heartbeat_status: u16,
    response_delay: Option<Duration>,
}

impl Default for Recorded {
    fn default() -> Self {
        Self {
            registrations: Vec::new(),
            heartbeats: Vec::new(),
            register_status: 200,
            heartbeat_status: 200,
            response_delay: None,
        }
    }
}

#[derive(Clone, Default)]
struct ServerState {
    recorded: Arc<Mutex<Recorded>>,
}

pub struct MockBackendServer {
    pub base_url: String,
    state: ServerState,
    handle: JoinHandle<()>,
}

impl MockBackendServer {
    /// Serves `/workers/register` and `/hooks/heartbeat` under `base_url`.
    pub async fn spawn() -> Self {
        let state = ServerState::default();
        let app = Router::new()
            .route("/workers/register", post(register_handler))
            .route("/hooks/heartbeat", post(heartbeat_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr: SocketAddr = listener.local_addr().expect("mock backend addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock backend");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    pub fn set_register_status(&self, status: u16) {
        self.state.recorded.lock().unwrap().register_status = status;
    }

    pub fn set_heartbeat_status(&self, status: u16) {
        self.state.recorded.lock().unwrap().heartbeat_status = status;
    }

    /// Delay applied before every response.
    pub fn set_response_delay(&self, delay: Option<Duration>) {
        self.state.recorded.lock().unwrap().response_delay = delay;
    }

    pub fn registrations(&self) -> Vec<Value> {
        self.state.recorded.lock().unwrap().registrations.clone()
    }

    pub fn heartbeats(&self) -> Vec<Value> {
        self.state.recorded.lock().unwrap().heartbeats.clone()
    }
}

impl Drop for MockBackendServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn register_handler(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let (status, delay) = {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.registrations.push(body);
        (recorded.register_status, recorded.response_delay)
    };
    respond(status, delay, "registration rejected").await
}

async fn heartbeat_handler(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let (status, delay) = {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.heartbeats.push(body);
        (recorded.heartbeat_status, recorded.response_delay)
    };
    respond(status, delay, "heartbeat rejected").await
}

async fn respond(status: u16, delay: Option<Duration>, rejection: &str) -> (StatusCode, String) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_success() {
        (status, r#"{"ok":true}"#.to_string())
    } else {
        (status, rejection.to_string())
    }
}
