//! Scripted in-memory [`RedactionTransport`] for tracker tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use docushield_client::{
    AuditLog, DocumentUpload, HealthStatus, Operation, RedactionTransport, SubmitResponse,
    TransportError,
};
use docushield_core::{AuditEntry, AuditSummary, BoundingBox, Job, JobStatus, RedactionMethod};
use docushield_tracker::TrackerEvent;

/// One scripted answer to `fetch_status`.
#[derive(Debug, Clone)]
pub enum Reply {
    Status(JobStatus),
    Failed(&'static str),
    Fault(u16),
}

/// Answers status polls from a script. The last reply repeats forever.
pub struct ScriptedTransport {
    filename: String,
    replies: Mutex<VecDeque<Reply>>,
    audit: Mutex<Option<AuditLog>>,
    /// Simulated latency of each status request.
    pub status_delay: Duration,
    pub status_calls: AtomicUsize,
    pub audit_calls: AtomicUsize,
    submitted: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(filename: &str, replies: Vec<Reply>) -> Self {
        Self {
            filename: filename.to_string(),
            replies: Mutex::new(replies.into()),
            audit: Mutex::new(Some(AuditLog::default())),
            status_delay: Duration::ZERO,
            status_calls: AtomicUsize::new(0),
            audit_calls: AtomicUsize::new(0),
            submitted: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    /// `None` makes the audit endpoint fail.
    pub fn with_audit(self, audit: Option<AuditLog>) -> Self {
        *self.audit.lock().unwrap() = audit;
        self
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn audit_calls(&self) -> usize {
        self.audit_calls.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> Reply {
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().expect("script must not be empty")
        }
    }
}

/// Decrements the in-flight counter even when the request is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RedactionTransport for ScriptedTransport {
    async fn submit(&self, upload: &DocumentUpload) -> Result<SubmitResponse, TransportError> {
        let n = self.submitted.fetch_add(1, Ordering::SeqCst) + 1;
        if upload.filename.ends_with(".exe") {
            return Err(TransportError::api(
                Operation::Submit,
                400,
                Some("Unsupported file type".into()),
            ));
        }
        Ok(SubmitResponse {
            job_id: format!("job-{n}"),
            status: "queued".into(),
            message: "Document queued for processing".into(),
        })
    }

    async fn fetch_status(&self, job_id: &str) -> Result<Job, TransportError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }

        match self.next_reply() {
            Reply::Status(status) => Ok(job(job_id, &self.filename, status)),
            Reply::Failed(reason) => {
                let mut job = job(job_id, &self.filename, JobStatus::Failed);
                job.error = Some(reason.to_string());
                Ok(job)
            }
            Reply::Fault(status) => Err(TransportError::api(Operation::FetchStatus, status, None)),
        }
    }

    async fn fetch_audit(&self, _job_id: &str) -> Result<AuditLog, TransportError> {
        self.audit_calls.fetch_add(1, Ordering::SeqCst);
        self.audit
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| TransportError::api(Operation::FetchAudit, 500, None))
    }

    async fn fetch_artifact(&self, _job_id: &str) -> Result<Vec<u8>, TransportError> {
        Ok(b"%PDF-redacted".to_vec())
    }

    async fn health(&self) -> Result<HealthStatus, TransportError> {
        Ok(HealthStatus {
            status: "ok".into(),
            service: "DocuShield AI".into(),
        })
    }
}

pub fn job(id: &str, filename: &str, status: JobStatus) -> Job {
    Job {
        id: id.to_string(),
        filename: filename.to_string(),
        status,
        created_at: 1_714_557_600.0,
        error: None,
        download_url: None,
        audit_url: None,
    }
}

pub fn entry(pii_type: &str, page: u32) -> AuditEntry {
    AuditEntry {
        pii_type: pii_type.to_string(),
        method: RedactionMethod::Mask,
        bounding_box: BoundingBox {
            x: 10,
            y: 20,
            width: 80,
            height: 14,
        },
        page,
        confidence: 0.91,
        timestamp: "2024-05-01T10:00:00".into(),
    }
}

/// Audit log with three PERSON and two PHONE detections over three pages.
pub fn report_audit() -> AuditLog {
    let entries = vec![
        entry("PERSON", 0),
        entry("PHONE", 0),
        entry("PERSON", 1),
        entry("PERSON", 2),
        entry("PHONE", 2),
    ];
    let summary = AuditSummary::from_entries(&entries, 3);
    AuditLog {
        entries,
        summary: Some(summary),
        rejected_entries: 0,
    }
}

/// Drain every event currently buffered in `rx`.
pub fn drain(rx: &mut broadcast::Receiver<TrackerEvent>) -> Vec<TrackerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn progress_values(events: &[TrackerEvent]) -> Vec<f64> {
    events
        .iter()
        .filter_map(|e| match e {
            TrackerEvent::Progress { percent, .. } => Some(*percent),
            _ => None,
        })
        .collect()
}

pub fn terminal_count(events: &[TrackerEvent]) -> usize {
    events.iter().filter(|e| e.is_terminal()).count()
}
