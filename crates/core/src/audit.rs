//! Audit log entries and the terminal result record of a completed job.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{validate_unit_range, CoreError};
use crate::job::Job;
use crate::policy::RedactionMethod;
use crate::types::{JobId, Timestamp};

/// Page count assumed when the service reports none.
pub const DEFAULT_TOTAL_PAGES: u32 = 1;

// ---------------------------------------------------------------------------
// Audit entries
// ---------------------------------------------------------------------------

/// Region in page-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One detected-and-redacted item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Category tag, e.g. `PERSON`, `PHONE`, `FACE`.
    pub pii_type: String,
    pub method: RedactionMethod,
    #[serde(rename = "bbox")]
    pub bounding_box: BoundingBox,
    /// Zero-based page index.
    pub page: u32,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f64,
    /// When the service recorded the detection, as sent.
    pub timestamp: String,
}

impl AuditEntry {
    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_unit_range(self.confidence, "confidence")?;
        if self.pii_type.trim().is_empty() {
            return Err(CoreError::Validation(
                "pii_type must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Per-job detection summary as produced by the service.
///
/// Every field defaults, so a partially filled summary still parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_detections: u32,
    #[serde(default)]
    pub pii_types_found: Vec<String>,
    #[serde(default)]
    pub pii_counts: BTreeMap<String, u32>,
    #[serde(default)]
    pub processing_complete: bool,
}

impl AuditSummary {
    /// Derive a summary from raw entries.
    ///
    /// `pii_types_found` lists each category once, in first-seen order.
    pub fn from_entries(entries: &[AuditEntry], total_pages: u32) -> Self {
        let mut pii_counts = BTreeMap::new();
        let mut pii_types_found = Vec::new();
        for entry in entries {
            let count = pii_counts.entry(entry.pii_type.clone()).or_insert(0);
            if *count == 0 {
                pii_types_found.push(entry.pii_type.clone());
            }
            *count += 1;
        }
        Self {
            total_pages,
            total_detections: entries.len() as u32,
            pii_types_found,
            pii_counts,
            processing_complete: true,
        }
    }
}

// ---------------------------------------------------------------------------
// ProcessResult
// ---------------------------------------------------------------------------

/// Immutable aggregate for a completed job.
///
/// Built once, after the service reports `completed` and the audit log has
/// been fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    pub job_id: JobId,
    pub filename: String,
    pub total_pages: u32,
    pub detections_count: u32,
    /// In detection order, not sorted by page.
    pub audit_entries: Vec<AuditEntry>,
    pub summary: AuditSummary,
    /// Client-side time the result was assembled.
    pub completed_at: Timestamp,
}

impl ProcessResult {
    /// Merge job metadata with its audit log.
    ///
    /// A missing summary, or one reporting zero pages, yields
    /// [`DEFAULT_TOTAL_PAGES`]; a missing summary yields zero detections and
    /// an empty summary.
    pub fn assemble(job: &Job, entries: Vec<AuditEntry>, summary: Option<AuditSummary>) -> Self {
        let total_pages = summary
            .as_ref()
            .map(|s| s.total_pages)
            .filter(|&pages| pages > 0)
            .unwrap_or(DEFAULT_TOTAL_PAGES);
        let detections_count = summary.as_ref().map_or(0, |s| s.total_detections);

        Self {
            job_id: job.id.clone(),
            filename: job.filename.clone(),
            total_pages,
            detections_count,
            audit_entries: entries,
            summary: summary.unwrap_or_default(),
            completed_at: chrono::Utc::now(),
        }
    }

    /// Distinct categories present in the audit entries, first-seen order.
    pub fn pii_types_found(&self) -> Vec<String> {
        AuditSummary::from_entries(&self.audit_entries, self.total_pages).pii_types_found
    }

    /// Per-category counts computed from the audit entries.
    pub fn pii_counts(&self) -> BTreeMap<String, u32> {
        AuditSummary::from_entries(&self.audit_entries, self.total_pages).pii_counts
    }
}
