//! Events emitted while a job is tracked.

use std::sync::Arc;

use docushield_core::types::JobId;
use docushield_core::{JobStatus, ProcessResult};

/// A job lifecycle event, broadcast to the presentation layer.
///
/// For a given job, exactly one of `Completed`, `Failed` or `Cancelled` is
/// emitted, and nothing follows it.
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    /// The job moved to a new status.
    StatusChanged { job_id: JobId, status: JobStatus },

    /// Estimated progress in `[0, 100]`. Display only.
    Progress { job_id: JobId, percent: f64 },

    /// The job completed and its result was assembled.
    Completed {
        job_id: JobId,
        result: Arc<ProcessResult>,
    },

    /// The job failed, remotely or while being polled.
    Failed { job_id: JobId, reason: String },

    /// Tracking was cancelled by the consumer.
    Cancelled { job_id: JobId },
}

impl TrackerEvent {
    pub fn job_id(&self) -> &str {
        match self {
            Self::StatusChanged { job_id, .. }
            | Self::Progress { job_id, .. }
            | Self::Completed { job_id, .. }
            | Self::Failed { job_id, .. }
            | Self::Cancelled { job_id } => job_id,
        }
    }

    /// Whether no further events follow for this job.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }
}
