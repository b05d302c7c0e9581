//! Errors that abort a run of the binary.
//!
//! Failures of individual jobs are not errors here; they are collected in
//! the run report.

use std::path::PathBuf;

use docushield_client::TransportError;
use docushield_core::CoreError;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Settings(#[from] CoreError),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode audit report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No input files given")]
    NoInput,
}
