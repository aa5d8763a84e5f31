pub mod backend_client;
pub mod endpoint_resolver;
pub mod heartbeat_manager;
pub mod heartbeat_scheduler;
pub mod job_intake;
pub mod registration_gate;
pub mod worker_lifecycle;

pub use backend_client::{HttpBackendClient, MonitoringBackend};
pub use endpoint_resolver::EndpointResolver;
pub use heartbeat_manager::HeartbeatReporter;
pub use heartbeat_scheduler::HeartbeatScheduler;
pub use job_intake::JobIntake;
pub use registration_gate::RegistrationGate;
pub use worker_lifecycle::WorkerLifecycle;
