use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

use super::{HeartbeatReporter, RegistrationGate};

struct RunningLoop {
    shutdown_tx: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

/// Background registration + heartbeat loop at a fixed cadence.
///
/// The loop runs as a detached tokio task, so it never keeps the process
/// alive on its own; [`HeartbeatScheduler::stop`] cancels it explicitly.
pub struct HeartbeatScheduler {
    interval_ms: i64,
    registration: Arc<RegistrationGate>,
    reporter: Arc<HeartbeatReporter>,
    running: Mutex<Option<RunningLoop>>,
}

impl HeartbeatScheduler {
    pub fn new(
        interval_ms: i64,
        registration: Arc<RegistrationGate>,
        reporter: Arc<HeartbeatReporter>,
    ) -> Self {
        Self {
            interval_ms,
            registration,
            reporter,
            running: Mutex::new(None),
        }
    }

    /// Returns false when already running or when the interval is not positive.
    pub async fn start(&self, endpoint: Option<String>) -> bool {
        let mut running = self.running.lock().await;
        if running.is_some() || self.interval_ms <= 0 {
            return false;
        }

        let period = Duration::from_millis(self.interval_ms as u64);
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        let registration = Arc::clone(&self.registration);
        let reporter = Arc::clone(&self.reporter);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let registration = Arc::clone(&registration);
                        let reporter = Arc::clone(&reporter);
                        let endpoint = endpoint.clone();
                        // A panicking tick must not end the loop.
                        let tick = tokio::spawn(async move {
                            registration.ensure_registration(endpoint.as_deref()).await;
                            reporter.send_heartbeat(endpoint.as_deref(), None).await;
                        });
                        if let Err(e) = tick.await {
                            error!("Heartbeat loop error: {}", e);
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Heartbeat loop shutting down");
                        break;
                    }
                }
            }
        });

        info!(interval_ms = self.interval_ms, "Heartbeat loop started");
        *running = Some(RunningLoop { shutdown_tx, handle });
        true
    }

    pub async fn stop(&self) {
        let Some(running) = self.running.lock().await.take() else {
            return;
        };
        let _ = running.shutdown_tx.send(());
        // A tick stuck on the backend is not waited for.
        running.handle.abort();
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }
}
