//! Background submission queue for pipeline runs.
//!
//! [`PipelineQueue::submit`] spawns the pipeline as a detached task and
//! guarantees at most one in-flight task per batch id. The guarantee is
//! structural (an in-process set) and sits in front of the cache lock,
//! which stays the cross-process backstop.

use std::sync::Arc;

use dashmap::DashSet;
use tokio::task::JoinHandle;
use tracing::debug;

use keywordforge_shared::{BatchId, PipelineError, Result};

use crate::pipeline::{PipelineDeps, PipelineObserver, PipelineOutcome, process_batch};

/// Spawns and tracks pipeline runs, one per batch at most.
pub struct PipelineQueue {
    deps: Arc<PipelineDeps>,
    in_flight: Arc<DashSet<BatchId>>,
}

impl PipelineQueue {
    pub fn new(deps: Arc<PipelineDeps>) -> Self {
        Self {
            deps,
            in_flight: Arc::new(DashSet::new()),
        }
    }

    /// Submit one batch for background processing.
    ///
    /// Returns the spawned task's handle, or
    /// [`PipelineError::AlreadyProcessing`] without spawning when a run for
    /// this batch is still in flight.
    pub fn submit(
        &self,
        user_id: String,
        batch_id: BatchId,
        observer: Arc<dyn PipelineObserver>,
    ) -> Result<JoinHandle<Result<PipelineOutcome>>> {
        if !self.in_flight.insert(batch_id) {
            debug!(%batch_id, "submit rejected, batch already in flight");
            return Err(PipelineError::AlreadyProcessing {
                batch_id: batch_id.to_string(),
            });
        }

        let deps = Arc::clone(&self.deps);
        let in_flight = Arc::clone(&self.in_flight);
        let handle = tokio::spawn(async move {
            let result = process_batch(&deps, &user_id, batch_id, observer.as_ref()).await;
            in_flight.remove(&batch_id);
            result
        });
        Ok(handle)
    }

    /// Whether a run for this batch is currently in flight.
    pub fn is_in_flight(&self, batch_id: BatchId) -> bool {
        self.in_flight.contains(&batch_id)
    }
}
