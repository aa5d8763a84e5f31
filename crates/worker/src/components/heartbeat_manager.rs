use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error};

use super::MonitoringBackend;
use crate::identity::WorkerIdentity;
use crate::models::HeartbeatPayload;
use crate::state::LifecycleState;

/// Sends liveness reports to the backend. Heartbeats are not deduplicated;
/// overlapping calls from requests and the scheduler are allowed.
pub struct HeartbeatReporter {
    identity: Arc<WorkerIdentity>,
    backend: Arc<dyn MonitoringBackend>,
    state: Arc<LifecycleState>,
}

impl HeartbeatReporter {
    pub fn new(
        identity: Arc<WorkerIdentity>,
        backend: Arc<dyn MonitoringBackend>,
        state: Arc<LifecycleState>,
    ) -> Self {
        Self {
            identity,
            backend,
            state,
        }
    }

    /// `note` defaults to the current `last_error`. Failures are recorded
    /// and logged here and never returned.
    pub async fn send_heartbeat(&self, endpoint: Option<&str>, note: Option<String>) {
        let notes = match note {
            Some(note) => Some(note),
            None => self.state.last_error().await,
        };
        let payload = HeartbeatPayload::new(&self.identity, notes, Utc::now());

        match self.backend.send_heartbeat(&payload).await {
            Ok(()) => {
                self.state.record_heartbeat(payload.timestamp).await;
                debug!(
                    worker_id = %self.identity.id,
                    endpoint = endpoint.unwrap_or_default(),
                    "Heartbeat acknowledged"
                );
            }
            Err(e) => {
                self.state.record_error(e.to_string()).await;
                error!(worker_id = %self.identity.id, error = %e, "Heartbeat failed");
            }
        }
    }
}
