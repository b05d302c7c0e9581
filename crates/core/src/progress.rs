//! Artificial progress estimation.
//!
//! The service only reports coarse status, so the client fakes a
//! continuously advancing percentage. The value is a display heuristic and
//! never a measurement: it stays at or below [`PROGRESS_CEILING`] until the
//! job is actually `completed`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::job::JobStatus;

/// Highest value shown before real completion.
pub const PROGRESS_CEILING: f64 = 85.0;
/// Value shown once the job completed.
pub const PROGRESS_COMPLETE: f64 = 100.0;
/// Upper bound of a single `processing` tick increment.
pub const MAX_PROGRESS_STEP: f64 = 20.0;

/// Compute the next progress value from the previous one.
///
/// * `queued` keeps the previous value.
/// * `processing` advances by `step` (clamped to `[0, MAX_PROGRESS_STEP]`)
///   without passing [`PROGRESS_CEILING`].
/// * `completed` snaps to [`PROGRESS_COMPLETE`].
/// * `failed` freezes the previous value.
pub fn estimate(previous: f64, status: JobStatus, step: f64) -> f64 {
    let previous = if previous.is_finite() {
        previous.clamp(0.0, PROGRESS_COMPLETE)
    } else {
        0.0
    };
    match status {
        JobStatus::Queued | JobStatus::Failed => previous,
        JobStatus::Processing => {
            let step = if step.is_finite() {
                step.clamp(0.0, MAX_PROGRESS_STEP)
            } else {
                0.0
            };
            (previous + step).min(PROGRESS_CEILING).max(previous)
        }
        JobStatus::Completed => PROGRESS_COMPLETE,
    }
}

/// Source of progress values for one job.
///
/// Swappable so a real progress signal can replace the random walk.
pub trait ProgressEstimator: Send + Sync {
    fn next(&mut self, previous: f64, status: JobStatus) -> f64;
}

/// Random walk: each `processing` tick adds a uniform step in
/// `[0, MAX_PROGRESS_STEP]`.
pub struct RandomStepEstimator {
    rng: StdRng,
}

impl RandomStepEstimator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic sequence, for tests and reproducible demos.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomStepEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressEstimator for RandomStepEstimator {
    fn next(&mut self, previous: f64, status: JobStatus) -> f64 {
        let step = if status == JobStatus::Processing {
            self.rng.random_range(0.0..=MAX_PROGRESS_STEP)
        } else {
            0.0
        };
        estimate(previous, status, step)
    }
}

/// Fixed step per `processing` tick.
pub struct FixedStepEstimator {
    pub step: f64,
}

impl ProgressEstimator for FixedStepEstimator {
    fn next(&mut self, previous: f64, status: JobStatus) -> f64 {
        estimate(previous, status, self.step)
    }
}
