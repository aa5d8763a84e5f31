//! Registration, heartbeat and job-intake core of the external monitoring worker.
//!
//! Everything here is transport-agnostic: the HTTP adapters in `monitor-api`
//! hand request headers and parsed bodies to [`WorkerLifecycle`] and render
//! whatever it returns.

pub mod components;
pub mod identity;
pub mod models;
pub mod state;
pub mod timestamp;

pub use components::{
    EndpointResolver, HeartbeatReporter, HeartbeatScheduler, HttpBackendClient, JobIntake,
    MonitoringBackend, RegistrationGate, WorkerLifecycle,
};
pub use identity::WorkerIdentity;
pub use models::{
    HealthReport, HeartbeatPayload, HeartbeatStats, JobAcceptance, RegistrationRequest,
    RouteListing, StatusReport, WorkerStats, WorkerSummary, WORKER_ROUTES,
};
pub use state::LifecycleState;
