//! Redaction job model and its status state machine.
//!
//! The service reports a coarse status per job. Locally a job may only move
//! forward along `queued -> processing -> completed` or into `failed`; once
//! terminal it never changes again.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::JobId;

/// Failure message used when the service reports `failed` without a reason.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Processing failed";

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Coarse lifecycle status reported by the redaction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// `completed` and `failed` are terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Wire representation (`"queued"`, `"processing"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether an observed move from `self` to `next` is legal.
    ///
    /// Re-observing the same status is always allowed. A poll may skip the
    /// `processing` step entirely (`queued -> completed`) because the job can
    /// advance more than once between two polls.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self == next {
            return true;
        }
        match self {
            Self::Queued => true,
            Self::Processing => next.is_terminal(),
            Self::Completed | Self::Failed => false,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// One submitted document, as returned by `GET /jobs/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Service-assigned identifier. Immutable.
    pub id: JobId,
    /// Original file name. Immutable.
    pub filename: String,
    pub status: JobStatus,
    /// Creation time as reported by the service, in seconds.
    #[serde(default)]
    pub created_at: f64,
    /// Human-readable cause, only meaningful when `status` is `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_url: Option<String>,
}

impl Job {
    /// Failure reason to show the user, or `None` unless the job failed.
    ///
    /// Blank server messages fall back to [`DEFAULT_FAILURE_MESSAGE`].
    pub fn failure_reason(&self) -> Option<String> {
        if self.status != JobStatus::Failed {
            return None;
        }
        let reason = self
            .error
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_FAILURE_MESSAGE);
        Some(reason.to_string())
    }

    /// Apply a freshly polled view of the same job.
    ///
    /// Returns `Ok(true)` when the status changed, `Ok(false)` when it did
    /// not. An update for another job or one that would move the status
    /// backwards is rejected and leaves `self` untouched.
    pub fn apply_update(&mut self, update: Job) -> Result<bool, CoreError> {
        if update.id != self.id {
            return Err(CoreError::Validation(format!(
                "status update for job '{}' applied to job '{}'",
                update.id, self.id
            )));
        }
        if !self.status.can_transition_to(update.status) {
            return Err(CoreError::Validation(format!(
                "illegal status transition {} -> {} for job '{}'",
                self.status, update.status, self.id
            )));
        }

        let changed = self.status != update.status;
        self.status = update.status;
        self.error = if update.status == JobStatus::Failed {
            update.error
        } else {
            None
        };
        if update.download_url.is_some() {
            self.download_url = update.download_url;
        }
        if update.audit_url.is_some() {
            self.audit_url = update.audit_url;
        }
        Ok(changed)
    }
}
