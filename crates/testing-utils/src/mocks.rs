//! In-memory monitoring backend

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use monitor_errors::{MonitorError, MonitorResult};
use monitor_worker::{HeartbeatPayload, MonitoringBackend, RegistrationRequest};
use tokio::sync::watch;

#[derive(Debug, Default)]
struct MockBackendState {
    registrations: Vec<RegistrationRequest>,
    heartbeats: Vec<HeartbeatPayload>,
    registration_failures: VecDeque<(u16, String)>,
    heartbeat_failure: Option<(u16, String)>,
}

/// Records every call. Failures are scripted per operation.
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockBackendState>>,
    hold: Arc<watch::Sender<bool>>,
}

impl MockBackend {
    pub fn new() -> Self {
        let (hold, _) = watch::channel(false);
        Self {
            state: Arc::new(Mutex::new(MockBackendState::default())),
            hold: Arc::new(hold),
        }
    }

    /// The next `count` registrations answer with `status`.
    pub fn fail_registrations(&self, count: usize, status: u16, body: &str) {
        let mut state = self.state.lock().unwrap();
        for _ in 0..count {
            state.registration_failures.push_back((status, body.to_string()));
        }
    }

    /// Every heartbeat answers with `status` until cleared with `None`.
    pub fn set_heartbeat_failure(&self, failure: Option<(u16, &str)>) {
        self.state.lock().unwrap().heartbeat_failure =
            failure.map(|(status, body)| (status, body.to_string()));
    }

    /// Registration calls stay pending until [`MockBackend::release_registrations`].
    pub fn hold_registrations(&self) {
        self.hold.send_replace(true);
    }

    pub fn release_registrations(&self) {
        self.hold.send_replace(false);
    }

    pub fn registration_calls(&self) -> usize {
        self.state.lock().unwrap().registrations.len()
    }

    pub fn heartbeat_calls(&self) -> usize {
        self.state.lock().unwrap().heartbeats.len()
    }

    pub fn registrations(&self) -> Vec<RegistrationRequest> {
        self.state.lock().unwrap().registrations.clone()
    }

    pub fn heartbeats(&self) -> Vec<HeartbeatPayload> {
        self.state.lock().unwrap().heartbeats.clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MonitoringBackend for MockBackend {
    async fn register(&self, request: &RegistrationRequest) -> MonitorResult<()> {
        self.state.lock().unwrap().registrations.push(request.clone());

        let mut hold = self.hold.subscribe();
        let _ = hold.wait_for(|held| !*held).await;

        let failure = self.state.lock().unwrap().registration_failures.pop_front();
        match failure {
            Some((status, body)) => Err(MonitorError::backend("Registration", status, body)),
            None => Ok(()),
        }
    }

    async fn send_heartbeat(&self, payload: &HeartbeatPayload) -> MonitorResult<()> {
        let mut state = self.state.lock().unwrap();
        state.heartbeats.push(payload.clone());
        match state.heartbeat_failure.clone() {
            Some((status, body)) => Err(MonitorError::backend("Heartbeat", status, body)),
            None => Ok(()),
        }
    }
}
