//! The seam between the job workflow and the redaction service.

use async_trait::async_trait;

use docushield_core::Job;

use crate::error::TransportError;
use crate::upload::DocumentUpload;
use crate::wire::{AuditLog, HealthStatus, SubmitResponse};

/// Remote operations the workflow depends on.
///
/// Implementations never retry; retry policy belongs to the caller.
#[async_trait]
pub trait RedactionTransport: Send + Sync {
    /// Submit a document for redaction.
    async fn submit(&self, upload: &DocumentUpload) -> Result<SubmitResponse, TransportError>;

    /// Fetch the current state of a job.
    async fn fetch_status(&self, job_id: &str) -> Result<Job, TransportError>;

    /// Fetch the audit log of a completed job.
    async fn fetch_audit(&self, job_id: &str) -> Result<AuditLog, TransportError>;

    /// Download the redacted artifact.
    async fn fetch_artifact(&self, job_id: &str) -> Result<Vec<u8>, TransportError>;

    /// Liveness check. Not part of the job workflow.
    async fn health(&self) -> Result<HealthStatus, TransportError>;
}
