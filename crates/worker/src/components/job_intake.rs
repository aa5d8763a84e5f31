use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::models::JobAcceptance;
use crate::state::LifecycleState;

/// Counts pushed job batches. Jobs are not interpreted or dispatched.
pub struct JobIntake {
    state: Arc<LifecycleState>,
}

impl JobIntake {
    pub fn new(state: Arc<LifecycleState>) -> Self {
        Self { state }
    }

    /// Anything other than an object with a `jobs` array is an empty batch.
    pub async fn handle_jobs(&self, body: Option<&Value>) -> JobAcceptance {
        let accepted = body
            .and_then(|body| body.get("jobs"))
            .and_then(Value::as_array)
            .map_or(0, Vec::len);

        if accepted > 0 {
            let total = self.state.add_jobs(accepted as u64).await;
            debug!(accepted, total, "Accepted job batch");
        }

        JobAcceptance { accepted }
    }
}
