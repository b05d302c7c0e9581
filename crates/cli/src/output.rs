//! Files written at the end of a run.

use std::path::{Path, PathBuf};

use docushield_core::ProcessResult;

use crate::error::CliError;

/// Name of the redacted artifact for an uploaded file.
///
/// Only the final path component of `filename` is kept, so a server-echoed
/// name can never escape the output directory.
pub fn redacted_file_name(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    format!("redacted_{base}")
}

/// Write the redacted artifact of `filename` into `dir`.
pub async fn write_artifact(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, CliError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| CliError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

    let path = dir.join(redacted_file_name(filename));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// Write all results as a pretty-printed JSON array.
pub async fn write_audit_report(path: &Path, results: &[ProcessResult]) -> Result<(), CliError> {
    let body = serde_json::to_vec_pretty(results)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| CliError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(path, body)
        .await
        .map_err(|source| CliError::Write {
            path: path.to_path_buf(),
            source,
        })
}
