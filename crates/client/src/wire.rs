//! Response bodies of the redaction service and their lenient decoding.

use serde::{Deserialize, Serialize};

use docushield_core::{AuditEntry, AuditSummary};

/// Body of `POST /redact`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned identifier for the queued job.
    pub job_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
}

/// Error body attached to non-2xx responses.
///
/// `detail` is usually a string but validation errors carry a list, so it
/// is kept untyped and only used when it is a string.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub(crate) fn parse_detail(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .and_then(|d| d.as_str().map(str::to_string))
    }
}

/// Body of `GET /jobs/{id}/audit` before validation.
#[derive(Debug, Deserialize)]
pub(crate) struct RawAuditResponse {
    #[serde(default)]
    pub audit_entries: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub summary: Option<serde_json::Value>,
}

/// Audit log of a completed job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditLog {
    /// Valid entries in the order the service reported them.
    pub entries: Vec<AuditEntry>,
    /// `None` when the summary was absent or malformed.
    pub summary: Option<AuditSummary>,
    /// Number of entries dropped because they failed to parse or validate.
    pub rejected_entries: usize,
}

impl AuditLog {
    /// Decode the service payload, defaulting missing parts.
    ///
    /// Individual malformed entries are dropped and counted rather than
    /// failing the whole log.
    pub(crate) fn from_raw(raw: RawAuditResponse) -> Self {
        let raw_entries = raw.audit_entries.unwrap_or_default();
        let total = raw_entries.len();
        let entries: Vec<AuditEntry> = raw_entries
            .into_iter()
            .filter_map(|value| serde_json::from_value::<AuditEntry>(value).ok())
            .filter(|entry| entry.validate().is_ok())
            .collect();
        let rejected_entries = total - entries.len();

        let summary = raw
            .summary
            .filter(serde_json::Value::is_object)
            .and_then(|value| serde_json::from_value::<AuditSummary>(value).ok());

        Self {
            entries,
            summary,
            rejected_entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(value: serde_json::Value) -> RawAuditResponse {
        serde_json::from_value(value).expect("raw audit response")
    }

    #[test]
    fn full_audit_response_decodes() {
        let log = AuditLog::from_raw(raw(serde_json::json!({
            "job_id": "j1",
            "filename": "report.pdf",
            "audit_entries": [{
                "pii_type": "PERSON",
                "method": "mask",
                "bbox": {"x": 0, "y": 0, "width": 10, "height": 10},
                "page": 1,
                "confidence": 0.9,
                "timestamp": "2024-05-01T10:00:00"
            }],
            "summary": {
                "total_pages": 3,
                "total_detections": 5,
                "pii_types_found": ["PERSON", "PHONE"],
                "pii_counts": {"PERSON": 3, "PHONE": 2},
                "processing_complete": true
            }
        })));
        assert_eq!(log.entries.len(), 1);
        assert_eq!(log.rejected_entries, 0);
        let summary = log.summary.expect("summary present");
        assert_eq!(summary.total_pages, 3);
        assert_eq!(summary.pii_counts["PHONE"], 2);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let log = AuditLog::from_raw(raw(serde_json::json!({})));
        assert!(log.entries.is_empty());
        assert!(log.summary.is_none());

        let log = AuditLog::from_raw(raw(serde_json::json!({
            "audit_entries": null,
            "summary": null
        })));
        assert!(log.entries.is_empty());
        assert!(log.summary.is_none());
    }

    #[test]
    fn malformed_summary_is_dropped() {
        let log = AuditLog::from_raw(raw(serde_json::json!({
            "summary": {"total_pages": "three"}
        })));
        assert!(log.summary.is_none());

        let log = AuditLog::from_raw(raw(serde_json::json!({"summary": [1, 2]})));
        assert!(log.summary.is_none());
    }

    #[test]
    fn invalid_entries_are_counted_and_skipped() {
        let log = AuditLog::from_raw(raw(serde_json::json!({
            "audit_entries": [
                {"pii_type": "FACE"},
                {
                    "pii_type": "FACE",
                    "method": "blur",
                    "bbox": {"x": 0, "y": 0, "width": 4, "height": 4},
                    "page": 0,
                    "confidence": 1.7,
                    "timestamp": ""
                },
                {
                    "pii_type": "FACE",
                    "method": "blur",
                    "bbox": {"x": 0, "y": 0, "width": 4, "height": 4},
                    "page": 0,
                    "confidence": 0.7,
                    "timestamp": ""
                }
            ]
        })));
        assert_eq!(log.entries.len(), 1);
        assert_eq!(log.rejected_entries, 2);
    }

    #[test]
    fn error_detail_parsing() {
        assert_eq!(
            ErrorBody::parse_detail(br#"{"detail":"Job not found"}"#).as_deref(),
            Some("Job not found")
        );
        assert!(ErrorBody::parse_detail(br#"{"detail":[{"msg":"field required"}]}"#).is_none());
        assert!(ErrorBody::parse_detail(b"<html>502</html>").is_none());
        assert!(ErrorBody::parse_detail(b"").is_none());
    }
}
