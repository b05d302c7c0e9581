//! Job failure as seen by the consumer.
//!
//! Remote failures, polling faults and aggregation faults all surface as a
//! single [`JobFailure`] whose message can be rendered verbatim.

use docushield_client::TransportError;
use docushield_core::job::DEFAULT_FAILURE_MESSAGE;
use docushield_core::types::JobId;
use docushield_core::Job;

/// Message used when a polling fault carries no text.
pub const POLLING_FAILED_MESSAGE: &str = "Polling failed";

/// Where a job failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service reported `status = failed`.
    Remote,
    /// Fetching the job status failed.
    Transport,
    /// Fetching the audit log of a completed job failed.
    Aggregation,
}

/// Terminal failure of a tracked job. `reason` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct JobFailure {
    pub job_id: JobId,
    pub kind: FailureKind,
    pub reason: String,
}

impl JobFailure {
    /// Failure reported by the service for `job`.
    pub fn remote(job: &Job) -> Self {
        Self {
            job_id: job.id.clone(),
            kind: FailureKind::Remote,
            reason: job
                .failure_reason()
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
        }
    }

    /// Polling fault. Treated as a job failure, never retried further.
    pub fn transport(job_id: &str, err: &TransportError) -> Self {
        Self::from_error(job_id, FailureKind::Transport, err)
    }

    /// Audit fetch fault after the job completed.
    pub fn aggregation(job_id: &str, err: &TransportError) -> Self {
        Self::from_error(job_id, FailureKind::Aggregation, err)
    }

    fn from_error(job_id: &str, kind: FailureKind, err: &TransportError) -> Self {
        let message = err.to_string();
        let reason = if message.trim().is_empty() {
            POLLING_FAILED_MESSAGE.to_string()
        } else {
            message
        };
        Self {
            job_id: job_id.to_string(),
            kind,
            reason,
        }
    }
}
