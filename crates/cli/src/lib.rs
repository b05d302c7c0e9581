//! Command-line consumer of the DocuShield job tracker.
//!
//! Submits documents, logs job progress, and writes the redacted artifacts
//! and an optional audit report to disk.

pub mod config;
pub mod error;
pub mod output;
pub mod run;
