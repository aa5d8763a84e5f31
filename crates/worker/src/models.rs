//! Wire shapes exchanged with the monitoring backend and served to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::WorkerIdentity;

pub const WORKER_ROUTES: [&str; 3] = ["/jobs", "/status", "/healthz"];

/// Body of `POST {backend}/workers/register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub id: String,
    pub name: String,
    pub geo: String,
    pub endpoint: String,
    pub capabilities: Vec<String>,
}

impl RegistrationRequest {
    pub fn new(identity: &WorkerIdentity, endpoint: &str) -> Self {
        Self {
            id: identity.id.clone(),
            name: identity.name.clone(),
            geo: identity.geo.clone(),
            endpoint: endpoint.to_string(),
            capabilities: identity.capabilities.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatWorker {
    pub id: String,
    pub name: String,
    pub geo: String,
}

/// Queue depth fields are placeholders until real job dispatch exists; the
/// backend still expects every key to be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatStats {
    pub pending_jobs: u64,
    pub buffered_results: u64,
    pub in_flight: u64,
    pub last_result_at: Option<String>,
    pub notes: Option<String>,
}

/// Body of `POST {backend}/hooks/heartbeat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatPayload {
    pub worker: HeartbeatWorker,
    pub stats: HeartbeatStats,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl HeartbeatPayload {
    pub fn new(identity: &WorkerIdentity, notes: Option<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            worker: HeartbeatWorker {
                id: identity.id.clone(),
                name: identity.name.clone(),
                geo: identity.geo.clone(),
            },
            stats: HeartbeatStats {
                pending_jobs: 0,
                buffered_results: 0,
                in_flight: 0,
                last_result_at: None,
                notes,
            },
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStats {
    #[serde(with = "crate::timestamp::option")]
    pub last_heartbeat_at: Option<DateTime<Utc>>,
    #[serde(with = "crate::timestamp::option")]
    pub last_registration_at: Option<DateTime<Utc>>,
    pub jobs_processed: u64,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSummary {
    pub id: String,
    pub name: String,
    pub geo: String,
    pub backend_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub worker: WorkerSummary,
    pub stats: WorkerStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub ok: bool,
    pub worker_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteListing {
    pub ok: bool,
    pub worker_id: String,
    pub routes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAcceptance {
    pub accepted: usize,
}
