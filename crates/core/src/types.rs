/// Job identifiers are assigned by the redaction service and treated as opaque.
pub type JobId = String;

/// All client-side timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
