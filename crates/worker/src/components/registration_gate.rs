use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::MonitoringBackend;
use crate::identity::WorkerIdentity;
use crate::models::RegistrationRequest;
use crate::state::LifecycleState;

type RegistrationOutcome = Result<(), String>;
type RegistrationFuture = Shared<BoxFuture<'static, RegistrationOutcome>>;

struct InFlight {
    attempt: u64,
    registration: RegistrationFuture,
}

/// Keeps at most one registration call outstanding for the whole process.
///
/// The slot is filled before the call starts. Concurrent callers await the
/// same shared future. A successful registration stays in the slot so later
/// calls resolve immediately; a failed one is removed so the next caller
/// starts a fresh attempt.
pub struct RegistrationGate {
    identity: Arc<WorkerIdentity>,
    backend: Arc<dyn MonitoringBackend>,
    state: Arc<LifecycleState>,
    in_flight: Arc<Mutex<Option<InFlight>>>,
    attempts: AtomicU64,
}

impl RegistrationGate {
    pub fn new(
        identity: Arc<WorkerIdentity>,
        backend: Arc<dyn MonitoringBackend>,
        state: Arc<LifecycleState>,
    ) -> Self {
        Self {
            identity,
            backend,
            state,
            in_flight: Arc::new(Mutex::new(None)),
            attempts: AtomicU64::new(0),
        }
    }

    /// Never fails: a missing endpoint is skipped with a warning and a
    /// backend failure is logged and recorded into the lifecycle state.
    pub async fn ensure_registration(&self, endpoint: Option<&str>) {
        let target = endpoint
            .filter(|endpoint| !endpoint.is_empty())
            .or_else(|| self.identity.static_endpoint());
        let Some(target) = target else {
            warn!(
                worker_id = %self.identity.id,
                "No endpoint provided for registration"
            );
            return;
        };

        let registration = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some(in_flight) => in_flight.registration.clone(),
                None => {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    let registration = self.start_attempt(attempt, target.to_string());
                    *slot = Some(InFlight {
                        attempt,
                        registration: registration.clone(),
                    });
                    registration
                }
            }
        };

        if let Err(message) = registration.await {
            error!(
                worker_id = %self.identity.id,
                error = %message,
                "Registration failed"
            );
        }
    }

    fn start_attempt(&self, attempt: u64, endpoint: String) -> RegistrationFuture {
        let identity = Arc::clone(&self.identity);
        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        let in_flight = Arc::clone(&self.in_flight);

        async move {
            let request = RegistrationRequest::new(&identity, &endpoint);
            match backend.register(&request).await {
                Ok(()) => {
                    state.record_registration(Utc::now()).await;
                    info!(worker_id = %identity.id, %endpoint, attempt, "Worker registered");
                    Ok(())
                }
                Err(e) => {
                    let message = e.to_string();
                    {
                        let mut slot = in_flight.lock().await;
                        if slot.as_ref().is_some_and(|current| current.attempt == attempt) {
                            *slot = None;
                        }
                    }
                    state.record_error(message.clone()).await;
                    Err(message)
                }
            }
        }
        .boxed()
        .shared()
    }

    /// True once a registration attempt succeeded.
    pub async fn is_registered(&self) -> bool {
        let slot = self.in_flight.lock().await;
        matches!(
            slot.as_ref().and_then(|in_flight| in_flight.registration.peek()),
            Some(Ok(()))
        )
    }

    /// Number of registration calls started so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}
