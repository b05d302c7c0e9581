//! Per-job handle bundling the job identity with its cancellation token.

use tokio_util::sync::CancellationToken;

use docushield_core::types::JobId;

/// Explicit identity of one tracked job.
///
/// Every layer that acts on a job receives the handle, so a cancelled job
/// can never be confused with a later one. Clones share the same token.
#[derive(Debug, Clone)]
pub struct JobHandle {
    job_id: JobId,
    cancel: CancellationToken,
}

impl JobHandle {
    /// Handle with a fresh, independent token.
    pub fn new(job_id: impl Into<JobId>) -> Self {
        Self::with_token(job_id, CancellationToken::new())
    }

    /// Handle driven by an existing token, typically a child of a tracker's
    /// master token.
    pub fn with_token(job_id: impl Into<JobId>, cancel: CancellationToken) -> Self {
        Self {
            job_id: job_id.into(),
            cancel,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Stop tracking. Any response still in flight is discarded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the handle is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }
}
