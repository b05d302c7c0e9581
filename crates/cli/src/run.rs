//! One batch run: submit every input file, track the jobs concurrently and
//! write their artifacts.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use docushield_client::{DocumentUpload, RedactionTransport};
use docushield_core::settings::{load_settings, SettingsStore};
use docushield_core::ProcessResult;
use docushield_tracker::{JobOutcome, JobTracker, TrackerEvent};

use crate::config::CliConfig;
use crate::error::CliError;
use crate::output::{write_artifact, write_audit_report};

/// A file that did not produce a redacted artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub filename: String,
    pub reason: String,
}

/// Per-file results of a batch run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub completed: Vec<ProcessResult>,
    pub failed: Vec<FailedFile>,
    pub cancelled: usize,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.cancelled == 0
    }

    fn fail(&mut self, filename: impl Into<String>, reason: impl Into<String>) {
        self.failed.push(FailedFile {
            filename: filename.into(),
            reason: reason.into(),
        });
    }
}

/// Redact `files`, stopping early when `interrupt` resolves.
///
/// Errors are returned only for problems that affect the whole run; a
/// failing file is recorded in the [`RunReport`] and the batch continues.
pub async fn run(
    config: &CliConfig,
    files: &[PathBuf],
    transport: Arc<dyn RedactionTransport>,
    settings_store: &dyn SettingsStore,
    interrupt: impl Future<Output = ()>,
) -> Result<RunReport, CliError> {
    if files.is_empty() {
        return Err(CliError::NoInput);
    }

    match transport.health().await {
        Ok(health) => {
            tracing::info!(service = %health.service, status = %health.status, "Redaction service reachable")
        }
        Err(e) => tracing::warn!(error = %e, "Health check failed, continuing"),
    }

    let settings = load_settings(settings_store).await?;
    let tracker = JobTracker::new(Arc::clone(&transport), config.poller.clone());
    let logger = tokio::spawn(log_events(tracker.subscribe()));
    let mut report = RunReport::default();

    // --- Submission ---
    let mut submitted: Vec<(String, String)> = Vec::new();
    for path in files {
        let upload = match read_upload(path).await {
            Ok(upload) => upload.with_settings(settings.clone()),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Skipping unreadable file");
                report.fail(path.display().to_string(), e.to_string());
                continue;
            }
        };
        match tracker.submit(&upload).await {
            Ok(handle) => submitted.push((upload.filename, handle.job_id().to_string())),
            Err(e) => {
                tracing::error!(filename = %upload.filename, error = %e, "Submission failed");
                report.fail(upload.filename, e.to_string());
            }
        }
    }

    // --- Tracking ---
    let outcomes = {
        let waits = futures::future::join_all(submitted.iter().map(|(filename, job_id)| {
            let tracker = &tracker;
            async move { (filename.clone(), tracker.wait(job_id).await) }
        }));
        let mut waits = std::pin::pin!(waits);
        let mut interrupt = std::pin::pin!(interrupt);

        // Waits are polled first so each job is claimed before an interrupt
        // shuts the tracker down.
        let finished = tokio::select! {
            biased;
            outcomes = &mut waits => Some(outcomes),
            _ = &mut interrupt => None,
        };
        match finished {
            Some(outcomes) => outcomes,
            None => {
                tracing::warn!("Interrupted, cancelling all jobs");
                tracker.shutdown().await;
                waits.await
            }
        }
    };

    // --- Results ---
    for (filename, outcome) in outcomes {
        match outcome {
            Some(JobOutcome::Completed(result)) => {
                match download(transport.as_ref(), &config.output_dir, &result).await {
                    Ok(path) => {
                        tracing::info!(filename = %filename, path = %path.display(), "Redacted file written")
                    }
                    Err(e) => {
                        tracing::error!(filename = %filename, error = %e, "Artifact download failed");
                        report.fail(filename, e.to_string());
                    }
                }
                report.completed.push(result);
            }
            Some(JobOutcome::Failed(failure)) => report.fail(filename, failure.reason),
            Some(JobOutcome::Cancelled) => report.cancelled += 1,
            None => report.fail(filename, "Tracking task aborted"),
        }
    }

    if let Some(audit_file) = &config.audit_file {
        if !report.completed.is_empty() {
            write_audit_report(audit_file, &report.completed).await?;
            tracing::info!(path = %audit_file.display(), results = report.completed.len(), "Audit report written");
        }
    }

    // Dropping the tracker closes the event channel and ends the logger.
    drop(tracker);
    let _ = logger.await;

    tracing::info!(
        completed = report.completed.len(),
        failed = report.failed.len(),
        cancelled = report.cancelled,
        "Run finished",
    );
    Ok(report)
}

// ---- private helpers ----

async fn read_upload(path: &Path) -> Result<DocumentUpload, CliError> {
    DocumentUpload::from_path(path)
        .await
        .map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })
}

async fn download(
    transport: &dyn RedactionTransport,
    output_dir: &Path,
    result: &ProcessResult,
) -> Result<PathBuf, CliError> {
    let bytes = transport.fetch_artifact(&result.job_id).await?;
    write_artifact(output_dir, &result.filename, &bytes).await
}

/// Render tracker events as log lines until the channel closes.
async fn log_events(mut events: broadcast::Receiver<TrackerEvent>) {
    loop {
        match events.recv().await {
            Ok(TrackerEvent::StatusChanged { job_id, status }) => {
                tracing::info!(job_id = %job_id, status = %status, "Status")
            }
            Ok(TrackerEvent::Progress { job_id, percent }) => {
                tracing::info!(job_id = %job_id, percent = (percent.round() as u64), "Progress")
            }
            Ok(TrackerEvent::Completed { job_id, result }) => tracing::info!(
                job_id = %job_id,
                filename = %result.filename,
                pages = result.total_pages,
                detections = result.detections_count,
                pii_types = ?result.pii_types_found(),
                "Redaction complete",
            ),
            Ok(TrackerEvent::Failed { job_id, reason }) => {
                tracing::error!(job_id = %job_id, reason = %reason, "Redaction failed")
            }
            Ok(TrackerEvent::Cancelled { job_id }) => {
                tracing::warn!(job_id = %job_id, "Redaction cancelled")
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event logger lagged behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
