//! Domain types and pure logic for the DocuShield redaction client.
//!
//! Nothing in this crate performs I/O. The transport lives in
//! `docushield-client` and the polling workflow in `docushield-tracker`.

pub mod audit;
pub mod error;
pub mod job;
pub mod policy;
pub mod progress;
pub mod settings;
pub mod types;

pub use audit::{AuditEntry, AuditSummary, BoundingBox, ProcessResult};
pub use error::CoreError;
pub use job::{Job, JobStatus};
pub use policy::{PiiType, RedactionMethod, RedactionPolicy, RedactionSettings, Thresholds};
