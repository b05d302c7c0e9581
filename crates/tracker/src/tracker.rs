//! Multi-job tracking manager.
//!
//! [`JobTracker`] submits documents, spawns one [`JobPoller`] task per job
//! and exposes cancellation and outcome collection. Lifecycle events of all
//! jobs are broadcast via a [`tokio::sync::broadcast`] channel. Call
//! [`JobTracker::subscribe`] to receive them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use docushield_client::{DocumentUpload, RedactionTransport, TransportError};
use docushield_core::types::JobId;
use docushield_core::Job;

use crate::events::TrackerEvent;
use crate::handle::JobHandle;
use crate::poller::{JobOutcome, JobPoller, PollerConfig};

/// Broadcast channel capacity for tracker events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How long shutdown waits for each polling task to exit.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Tracks any number of concurrent redaction jobs.
pub struct JobTracker {
    transport: Arc<dyn RedactionTransport>,
    config: PollerConfig,
    /// Polling tasks indexed by job id.
    jobs: RwLock<HashMap<JobId, TrackedJob>>,
    event_tx: broadcast::Sender<TrackerEvent>,
    /// Master cancellation token, cancelled during shutdown.
    cancel: CancellationToken,
}

/// Internal bookkeeping for a single tracked job.
struct TrackedJob {
    handle: JobHandle,
    task_handle: JoinHandle<JobOutcome>,
}

impl JobTracker {
    pub fn new(transport: Arc<dyn RedactionTransport>, config: PollerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            transport,
            config,
            jobs: RwLock::new(HashMap::new()),
            event_tx,
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribe to lifecycle events of all tracked jobs.
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.event_tx.subscribe()
    }

    /// Transport shared by all pollers, e.g. for downloading artifacts.
    pub fn transport(&self) -> &Arc<dyn RedactionTransport> {
        &self.transport
    }

    /// Submit a document and start tracking the resulting job.
    ///
    /// The initial status is read once right after submission, so a job
    /// rejected at intake fails before any polling interval elapses.
    pub async fn submit(&self, upload: &DocumentUpload) -> Result<JobHandle, TransportError> {
        let accepted = self.transport.submit(upload).await?;
        let job = self.transport.fetch_status(&accepted.job_id).await?;
        Ok(self.track(job).await)
    }

    /// Start polling an already-submitted job.
    ///
    /// While the job's poller is still running, tracking the same id again
    /// returns the existing handle and starts nothing. A finished but
    /// uncollected entry is replaced.
    pub async fn track(&self, job: Job) -> JobHandle {
        let mut jobs = self.jobs.write().await;
        if let Some(existing) = jobs.get(&job.id) {
            if !existing.task_handle.is_finished() {
                tracing::debug!(job_id = %job.id, "Job already tracked, reusing handle");
                return existing.handle.clone();
            }
            tracing::warn!(job_id = %job.id, "Discarding uncollected outcome of earlier tracking");
        }

        let handle = JobHandle::with_token(job.id.clone(), self.cancel.child_token());
        let poller = JobPoller::new(Arc::clone(&self.transport), self.config.clone());

        let task_handle = {
            let handle = handle.clone();
            let event_tx = self.event_tx.clone();
            tokio::spawn(async move { poller.run(&handle, job, &event_tx).await })
        };

        jobs.insert(
            handle.job_id().to_string(),
            TrackedJob {
                handle: handle.clone(),
                task_handle,
            },
        );
        handle
    }

    /// Cancel tracking of `job_id`.
    ///
    /// Returns `false` when the job is unknown or already finished. The
    /// outcome remains collectable via [`JobTracker::wait`].
    pub async fn cancel(&self, job_id: &str) -> bool {
        let jobs = self.jobs.read().await;
        match jobs.get(job_id) {
            Some(tracked) if !tracked.task_handle.is_finished() => {
                tracing::info!(job_id, "Cancelling job tracking");
                tracked.handle.cancel();
                true
            }
            _ => false,
        }
    }

    /// Wait for `job_id` to reach its outcome and stop tracking it.
    ///
    /// Returns `None` when the job is not tracked.
    pub async fn wait(&self, job_id: &str) -> Option<JobOutcome> {
        let tracked = self.jobs.write().await.remove(job_id)?;
        match tracked.task_handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!(job_id, error = %e, "Polling task panicked");
                None
            }
        }
    }

    /// Ids of jobs whose polling task is still running.
    pub async fn active_jobs(&self) -> Vec<JobId> {
        self.jobs
            .read()
            .await
            .iter()
            .filter(|(_, tracked)| !tracked.task_handle.is_finished())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Cancel every job and wait for the polling tasks to exit.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down job tracker");
        self.cancel.cancel();

        let drained: Vec<(JobId, TrackedJob)> = self.jobs.write().await.drain().collect();
        let stops = drained.into_iter().map(|(job_id, tracked)| async move {
            if tokio::time::timeout(SHUTDOWN_TIMEOUT, tracked.task_handle)
                .await
                .is_err()
            {
                tracing::warn!(job_id = %job_id, "Polling task did not stop in time");
            }
        });
        futures::future::join_all(stops).await;

        tracing::info!("Job tracker shut down complete");
    }
}
