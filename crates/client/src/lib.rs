//! HTTP client for the DocuShield redaction service.
//!
//! [`RedactionTransport`] is the trait the job workflow depends on;
//! [`RedactionApi`] implements it over [`reqwest`].

pub mod api;
pub mod config;
pub mod error;
pub mod transport;
pub mod upload;
pub mod wire;

pub use api::RedactionApi;
pub use config::ClientConfig;
pub use error::{Operation, TransportError};
pub use transport::RedactionTransport;
pub use upload::DocumentUpload;
pub use wire::{AuditLog, HealthStatus, SubmitResponse};
