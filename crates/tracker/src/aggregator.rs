//! Builds the terminal [`ProcessResult`] of a completed job.

use docushield_client::{RedactionTransport, TransportError};
use docushield_core::{Job, ProcessResult};

/// Fetch the audit log of `job` and merge it with the job metadata.
///
/// Called once per job, right after the poller observes `completed`.
pub async fn aggregate(
    transport: &dyn RedactionTransport,
    job: &Job,
) -> Result<ProcessResult, TransportError> {
    let audit = transport.fetch_audit(&job.id).await?;
    if audit.summary.is_none() {
        tracing::debug!(
            job_id = %job.id,
            "Audit summary missing or malformed, using defaults",
        );
    }

    let result = ProcessResult::assemble(job, audit.entries, audit.summary);
    tracing::info!(
        job_id = %result.job_id,
        total_pages = result.total_pages,
        detections = result.detections_count,
        entries = result.audit_entries.len(),
        "Process result assembled",
    );
    Ok(result)
}
