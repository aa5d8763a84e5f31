use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::WorkerStats;

#[derive(Debug, Default)]
struct LifecycleFields {
    last_heartbeat_at: Option<DateTime<Utc>>,
    last_registration_at: Option<DateTime<Utc>>,
    jobs_processed: u64,
    last_error: Option<String>,
}

/// Mutable lifecycle bookkeeping shared by one running worker.
///
/// Every mutation is a single field write under the lock; the lock is never
/// held across a network call.
#[derive(Debug, Default)]
pub struct LifecycleState {
    fields: RwLock<LifecycleFields>,
}

impl LifecycleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_registration(&self, at: DateTime<Utc>) {
        self.fields.write().await.last_registration_at = Some(at);
    }

    /// A successful heartbeat also heals any previously recorded error.
    pub async fn record_heartbeat(&self, at: DateTime<Utc>) {
        let mut fields = self.fields.write().await;
        fields.last_heartbeat_at = Some(at);
        fields.last_error = None;
    }

    pub async fn record_error(&self, message: impl Into<String>) {
        self.fields.write().await.last_error = Some(message.into());
    }

    /// Returns the new total.
    pub async fn add_jobs(&self, count: u64) -> u64 {
        let mut fields = self.fields.write().await;
        fields.jobs_processed = fields.jobs_processed.saturating_add(count);
        fields.jobs_processed
    }

    pub async fn last_error(&self) -> Option<String> {
        self.fields.read().await.last_error.clone()
    }

    pub async fn snapshot(&self) -> WorkerStats {
        let fields = self.fields.read().await;
        WorkerStats {
            last_heartbeat_at: fields.last_heartbeat_at,
            last_registration_at: fields.last_registration_at,
            jobs_processed: fields.jobs_processed,
            last_error: fields.last_error.clone(),
        }
    }
}
