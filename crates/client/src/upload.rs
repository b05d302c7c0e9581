//! Document payload for `POST /redact`.

use std::path::Path;

use docushield_core::RedactionSettings;

/// A file to submit, plus optional settings passed through to the service.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub settings: Option<RedactionSettings>,
}

impl DocumentUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
            settings: None,
        }
    }

    /// Read a file from disk. The upload keeps only the final path component
    /// as its file name.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(filename, bytes))
    }

    /// Attach redaction settings to send alongside the file.
    pub fn with_settings(mut self, settings: RedactionSettings) -> Self {
        self.settings = Some(settings);
        self
    }
}
