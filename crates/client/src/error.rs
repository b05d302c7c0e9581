//! Transport-level errors.
//!
//! Every failure of a remote call collapses into [`TransportError`]. Its
//! `Display` output is meant to be shown to the user verbatim.

/// The remote operation that failed, used to pick a fallback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Submit,
    FetchStatus,
    FetchAudit,
    FetchArtifact,
    Health,
}

impl Operation {
    /// Message used when the service gives no `detail`.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::Submit => "Upload failed",
            Self::FetchStatus => "Failed to get job status",
            Self::FetchAudit => "Failed to get audit log",
            Self::FetchArtifact => "Download failed",
            Self::Health => "Health check failed",
        }
    }
}

/// Errors from the redaction service HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    ///
    /// `message` is the server `detail` when present, otherwise the
    /// operation's fallback message.
    #[error("{message}")]
    Api {
        operation: Operation,
        status: u16,
        detail: Option<String>,
        message: String,
    },

    /// A response or request body was not valid JSON for the expected shape.
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl TransportError {
    /// Build an [`TransportError::Api`], resolving the display message.
    pub fn api(operation: Operation, status: u16, detail: Option<String>) -> Self {
        let detail = detail.filter(|d| !d.trim().is_empty());
        let message = detail
            .clone()
            .unwrap_or_else(|| operation.fallback_message().to_string());
        Self::Api {
            operation,
            status,
            detail,
            message,
        }
    }

    /// HTTP status of a non-2xx response, if that is what failed.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Json(_) => None,
        }
    }

    /// Server-supplied detail, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}
