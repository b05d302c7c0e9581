//! Asynchronous job tracking for the DocuShield redaction client.
//!
//! A submitted job is polled until it reaches a terminal status. While it
//! runs, a display-only progress value is estimated; once it completes, the
//! audit log is fetched and merged into a single [`ProcessResult`].
//!
//! [`ProcessResult`]: docushield_core::ProcessResult

pub mod aggregator;
pub mod error;
pub mod events;
pub mod handle;
pub mod poller;
pub mod retry;
pub mod tracker;

pub use error::{FailureKind, JobFailure};
pub use events::TrackerEvent;
pub use handle::JobHandle;
pub use poller::{JobOutcome, JobPoller, PollerConfig};
pub use retry::RetryPolicy;
pub use tracker::JobTracker;
