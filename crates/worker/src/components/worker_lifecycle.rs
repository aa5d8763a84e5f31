use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;
use monitor_config::AppConfig;
use monitor_errors::MonitorResult;
use serde_json::Value;
use tracing::info;

use super::{
    EndpointResolver, HeartbeatReporter, HeartbeatScheduler, HttpBackendClient, JobIntake,
    MonitoringBackend, RegistrationGate,
};
use crate::identity::WorkerIdentity;
use crate::models::{
    HealthReport, JobAcceptance, RouteListing, StatusReport, WorkerStats, WorkerSummary,
    WORKER_ROUTES,
};
use crate::state::LifecycleState;

/// One running worker: identity, lifecycle state and the components that
/// mutate it. Transport adapters hold this behind an `Arc`.
pub struct WorkerLifecycle {
    identity: Arc<WorkerIdentity>,
    state: Arc<LifecycleState>,
    resolver: EndpointResolver,
    registration: Arc<RegistrationGate>,
    reporter: Arc<HeartbeatReporter>,
    scheduler: HeartbeatScheduler,
    intake: JobIntake,
}

impl WorkerLifecycle {
    pub fn new(identity: WorkerIdentity, backend: Arc<dyn MonitoringBackend>) -> Self {
        let identity = Arc::new(identity);
        let state = Arc::new(LifecycleState::new());
        let registration = Arc::new(RegistrationGate::new(
            Arc::clone(&identity),
            Arc::clone(&backend),
            Arc::clone(&state),
        ));
        let reporter = Arc::new(HeartbeatReporter::new(
            Arc::clone(&identity),
            backend,
            Arc::clone(&state),
        ));
        let scheduler = HeartbeatScheduler::new(
            identity.heartbeat_interval_ms,
            Arc::clone(&registration),
            Arc::clone(&reporter),
        );

        Self {
            resolver: EndpointResolver::new(identity.static_endpoint.clone()),
            intake: JobIntake::new(Arc::clone(&state)),
            identity,
            state,
            registration,
            reporter,
            scheduler,
        }
    }

    /// Builds the worker with a reqwest-backed backend client.
    pub fn from_config(config: &AppConfig) -> MonitorResult<Self> {
        let backend = HttpBackendClient::new(
            config.backend.base_url.clone(),
            Duration::from_millis(config.backend.request_timeout_ms),
        )?;
        Ok(Self::new(WorkerIdentity::from_config(config), Arc::new(backend)))
    }

    pub fn identity(&self) -> &WorkerIdentity {
        &self.identity
    }

    pub fn registration(&self) -> &RegistrationGate {
        &self.registration
    }

    pub fn resolve_endpoint(&self, headers: &HeaderMap, encrypted: bool) -> String {
        self.resolver.resolve(headers, encrypted)
    }

    /// The side effects every routed request performs before its handler:
    /// resolve the endpoint, make sure registration happened, then report
    /// a heartbeat. Returns the resolved endpoint.
    pub async fn prepare_request(&self, headers: &HeaderMap, encrypted: bool) -> String {
        let endpoint = self.resolve_endpoint(headers, encrypted);
        let endpoint_ref = Some(endpoint.as_str()).filter(|endpoint| !endpoint.is_empty());

        self.registration.ensure_registration(endpoint_ref).await;
        self.reporter.send_heartbeat(endpoint_ref, None).await;
        endpoint
    }

    pub async fn ensure_registration(&self, endpoint: Option<&str>) {
        self.registration.ensure_registration(endpoint).await;
    }

    pub async fn send_heartbeat(&self, endpoint: Option<&str>, note: Option<String>) {
        self.reporter.send_heartbeat(endpoint, note).await;
    }

    pub async fn handle_jobs(&self, body: Option<&Value>) -> JobAcceptance {
        self.intake.handle_jobs(body).await
    }

    pub async fn build_stats(&self) -> WorkerStats {
        self.state.snapshot().await
    }

    pub async fn status_report(&self) -> StatusReport {
        StatusReport {
            worker: WorkerSummary {
                id: self.identity.id.clone(),
                name: self.identity.name.clone(),
                geo: self.identity.geo.clone(),
                backend_url: self.identity.backend_base_url.clone(),
            },
            stats: self.build_stats().await,
        }
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            ok: true,
            worker_id: self.identity.id.clone(),
        }
    }

    pub fn route_listing(&self) -> RouteListing {
        RouteListing {
            ok: true,
            worker_id: self.identity.id.clone(),
            routes: WORKER_ROUTES.iter().map(|route| route.to_string()).collect(),
        }
    }

    /// Startup sequence once the listener is bound: register, report one
    /// heartbeat, then hand over to the background loop.
    pub async fn start(&self, endpoint: String) {
        info!(worker_id = %self.identity.id, %endpoint, "Starting worker lifecycle");
        self.registration.ensure_registration(Some(&endpoint)).await;
        self.reporter.send_heartbeat(Some(&endpoint), None).await;
        self.scheduler.start(Some(endpoint)).await;
    }

    pub async fn start_scheduler(&self, endpoint: Option<String>) -> bool {
        self.scheduler.start(endpoint).await
    }

    pub async fn stop(&self) {
        self.scheduler.stop().await;
        info!(worker_id = %self.identity.id, "Worker lifecycle stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.scheduler.is_running().await
    }
}
