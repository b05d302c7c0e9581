//! Status polling loop for a single job.
//!
//! [`JobPoller::run`] drives one job from its initial status to a terminal
//! outcome. Polls are strictly sequential: the next tick is armed only after
//! the previous response has been fully applied, so at most one status
//! request per job is ever in flight. Cancelling the [`JobHandle`] aborts the
//! loop at its next await point and drops any response still in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use docushield_client::{RedactionTransport, TransportError};
use docushield_core::progress::{ProgressEstimator, RandomStepEstimator};
use docushield_core::{Job, JobStatus, ProcessResult};

use crate::aggregator::aggregate;
use crate::error::JobFailure;
use crate::events::TrackerEvent;
use crate::handle::JobHandle;
use crate::retry::{retry, RetryPolicy};

/// Default interval between two status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default pause between assembling a result and delivering it, so a UI can
/// show the 100% state first.
pub const DEFAULT_COMPLETION_DELAY: Duration = Duration::from_millis(500);

/// Timing and retry settings for [`JobPoller`].
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub poll_interval: Duration,
    /// Cosmetic pacing only; zero delivers immediately.
    pub completion_delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            completion_delay: DEFAULT_COMPLETION_DELAY,
            retry: RetryPolicy::default(),
        }
    }
}

/// How tracking of a job ended.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(ProcessResult),
    Failed(JobFailure),
    /// Tracking was cancelled before a terminal outcome was delivered.
    Cancelled,
}

/// Owns the polling lifecycle of one job.
pub struct JobPoller {
    transport: Arc<dyn RedactionTransport>,
    config: PollerConfig,
    estimator: Box<dyn ProgressEstimator>,
}

impl JobPoller {
    /// Create a poller using the random-walk progress estimator.
    pub fn new(transport: Arc<dyn RedactionTransport>, config: PollerConfig) -> Self {
        Self {
            transport,
            config,
            estimator: Box::new(RandomStepEstimator::new()),
        }
    }

    /// Replace the progress estimator.
    pub fn with_estimator(mut self, estimator: Box<dyn ProgressEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Track `job` until it completes, fails, or `handle` is cancelled.
    ///
    /// The initial status is taken from `job` as given. A job that is
    /// already terminal is never polled. Exactly one of `Completed`,
    /// `Failed` or `Cancelled` is broadcast on `events`, and it is the last
    /// event for this job.
    pub async fn run(
        mut self,
        handle: &JobHandle,
        mut job: Job,
        events: &broadcast::Sender<TrackerEvent>,
    ) -> JobOutcome {
        if handle.is_cancelled() {
            return cancelled(handle, events);
        }

        let mut progress = 0.0;
        if !job.status.is_terminal() {
            tracing::info!(
                job_id = handle.job_id(),
                status = %job.status,
                poll_interval_ms = self.config.poll_interval.as_millis() as u64,
                "Tracking job",
            );
        }

        while !job.status.is_terminal() {
            tokio::select! {
                biased;
                _ = handle.cancelled() => return cancelled(handle, events),
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }

            let polled = tokio::select! {
                biased;
                _ = handle.cancelled() => return cancelled(handle, events),
                polled = self.fetch_status(handle.job_id()) => polled,
            };

            let update = match polled {
                Ok(update) => update,
                Err(e) => {
                    tracing::error!(
                        job_id = handle.job_id(),
                        error = %e,
                        "Status poll failed, failing job",
                    );
                    let failure = JobFailure::transport(handle.job_id(), &e);
                    return fail(handle, events, failure);
                }
            };

            match job.apply_update(update) {
                Ok(true) => {
                    tracing::info!(job_id = handle.job_id(), status = %job.status, "Job status changed");
                    emit(
                        handle,
                        events,
                        TrackerEvent::StatusChanged {
                            job_id: job.id.clone(),
                            status: job.status,
                        },
                    );
                }
                Ok(false) => {
                    tracing::debug!(job_id = handle.job_id(), status = %job.status, "Job status unchanged");
                }
                Err(e) => {
                    // Rejected updates leave status and progress untouched.
                    tracing::warn!(job_id = handle.job_id(), error = %e, "Ignoring status update");
                    continue;
                }
            }

            if !job.status.is_terminal() {
                progress = self.estimator.next(progress, job.status);
                tracing::debug!(job_id = handle.job_id(), percent = progress, "Estimated progress");
                emit(
                    handle,
                    events,
                    TrackerEvent::Progress {
                        job_id: job.id.clone(),
                        percent: progress,
                    },
                );
            }
        }

        match job.status {
            JobStatus::Completed => {
                progress = self.estimator.next(progress, JobStatus::Completed);
                emit(
                    handle,
                    events,
                    TrackerEvent::Progress {
                        job_id: job.id.clone(),
                        percent: progress,
                    },
                );
                self.complete(handle, &job, events).await
            }
            _ => {
                let failure = JobFailure::remote(&job);
                tracing::error!(
                    job_id = handle.job_id(),
                    reason = %failure.reason,
                    "Job failed remotely",
                );
                fail(handle, events, failure)
            }
        }
    }

    /// Aggregate the result of a completed job and deliver it.
    async fn complete(
        &self,
        handle: &JobHandle,
        job: &Job,
        events: &broadcast::Sender<TrackerEvent>,
    ) -> JobOutcome {
        let aggregated = tokio::select! {
            biased;
            _ = handle.cancelled() => return cancelled(handle, events),
            aggregated = aggregate(self.transport.as_ref(), job) => aggregated,
        };

        let result = match aggregated {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    job_id = handle.job_id(),
                    error = %e,
                    "Audit fetch failed, failing job",
                );
                return fail(handle, events, JobFailure::aggregation(handle.job_id(), &e));
            }
        };

        if !self.config.completion_delay.is_zero() {
            tokio::select! {
                biased;
                _ = handle.cancelled() => return cancelled(handle, events),
                _ = tokio::time::sleep(self.config.completion_delay) => {}
            }
        }

        if handle.is_cancelled() {
            return cancelled(handle, events);
        }
        tracing::info!(job_id = handle.job_id(), "Job completed");
        let _ = events.send(TrackerEvent::Completed {
            job_id: result.job_id.clone(),
            result: Arc::new(result.clone()),
        });
        JobOutcome::Completed(result)
    }

    /// Fetch the job status, retrying per the configured [`RetryPolicy`].
    async fn fetch_status(&self, job_id: &str) -> Result<Job, TransportError> {
        let transport = &self.transport;
        retry(&self.config.retry, move || transport.fetch_status(job_id)).await
    }
}

// ---- private helpers ----

/// Broadcast a non-terminal event unless the job was cancelled.
fn emit(handle: &JobHandle, events: &broadcast::Sender<TrackerEvent>, event: TrackerEvent) {
    if handle.is_cancelled() {
        return;
    }
    // A send error only means nobody is listening.
    let _ = events.send(event);
}

fn fail(
    handle: &JobHandle,
    events: &broadcast::Sender<TrackerEvent>,
    failure: JobFailure,
) -> JobOutcome {
    if handle.is_cancelled() {
        return cancelled(handle, events);
    }
    let _ = events.send(TrackerEvent::Failed {
        job_id: failure.job_id.clone(),
        reason: failure.reason.clone(),
    });
    JobOutcome::Failed(failure)
}

fn cancelled(handle: &JobHandle, events: &broadcast::Sender<TrackerEvent>) -> JobOutcome {
    tracing::info!(job_id = handle.job_id(), "Job tracking cancelled");
    let _ = events.send(TrackerEvent::Cancelled {
        job_id: handle.job_id().to_string(),
    });
    JobOutcome::Cancelled
}
