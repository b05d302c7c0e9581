//! REST API client for the redaction service.
//!
//! Wraps the service HTTP API (submission, job status, audit log, artifact
//! download, health) using [`reqwest`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use docushield_core::Job;

use crate::config::ClientConfig;
use crate::error::{Operation, TransportError};
use crate::transport::RedactionTransport;
use crate::upload::DocumentUpload;
use crate::wire::{AuditLog, ErrorBody, HealthStatus, RawAuditResponse, SubmitResponse};

/// HTTP client for a single redaction service instance.
#[derive(Debug, Clone)]
pub struct RedactionApi {
    client: reqwest::Client,
    api_url: String,
}

impl RedactionApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base URL including the API prefix, e.g.
    ///   `http://host:8080/api/v1`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    /// Build a client from [`ClientConfig`], applying the request timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, config.api_url.clone()))
    }

    /// Base URL requests are sent to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. On failure the
    /// `detail` field of a JSON body becomes the error message.
    async fn ensure_success(
        response: reqwest::Response,
        operation: Operation,
    ) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        let detail = ErrorBody::parse_detail(&body);
        tracing::debug!(
            status = status.as_u16(),
            ?operation,
            detail = detail.as_deref().unwrap_or(""),
            "Redaction service returned an error",
        );
        Err(TransportError::api(operation, status.as_u16(), detail))
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        operation: Operation,
    ) -> Result<T, TransportError> {
        let response = Self::ensure_success(response, operation).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice::<T>(&body)?)
    }

    fn upload_form(upload: &DocumentUpload) -> Result<Form, TransportError> {
        let file = Part::bytes(upload.bytes.clone()).file_name(upload.filename.clone());
        let mut form = Form::new().part("file", file);
        if let Some(settings) = &upload.settings {
            form = form
                .text("policies", serde_json::to_string(&settings.policies)?)
                .text("thresholds", serde_json::to_string(&settings.thresholds)?);
        }
        Ok(form)
    }
}

#[async_trait]
impl RedactionTransport for RedactionApi {
    /// `POST /redact` with a multipart body.
    async fn submit(&self, upload: &DocumentUpload) -> Result<SubmitResponse, TransportError> {
        let form = Self::upload_form(upload)?;
        let response = self
            .client
            .post(self.url("/redact"))
            .multipart(form)
            .send()
            .await?;

        let accepted: SubmitResponse = Self::parse_response(response, Operation::Submit).await?;
        tracing::info!(
            job_id = %accepted.job_id,
            filename = %upload.filename,
            "Document submitted for redaction",
        );
        Ok(accepted)
    }

    /// `GET /jobs/{id}`.
    async fn fetch_status(&self, job_id: &str) -> Result<Job, TransportError> {
        let response = self
            .client
            .get(self.url(&format!("/jobs/{job_id}")))
            .send()
            .await?;

        Self::parse_response(response, Operation::FetchStatus).await
    }

    /// `GET /jobs/{id}/audit`. Missing entries or summary are defaulted.
    async fn fetch_audit(&self, job_id: &str) -> Result<AuditLog, TransportError> {
        let response = self
            .client
            .get(self.url(&format!("/jobs/{job_id}/audit")))
            .send()
            .await?;

        let raw: RawAuditResponse = Self::parse_response(response, Operation::FetchAudit).await?;
        let log = AuditLog::from_raw(raw);
        if log.rejected_entries > 0 {
            tracing::warn!(
                job_id,
                rejected = log.rejected_entries,
                "Dropped malformed audit entries",
            );
        }
        Ok(log)
    }

    /// `GET /jobs/{id}/download`. Error bodies are not inspected.
    async fn fetch_artifact(&self, job_id: &str) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(self.url(&format!("/jobs/{job_id}/download")))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::api(
                Operation::FetchArtifact,
                status.as_u16(),
                None,
            ));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// `GET /health`.
    async fn health(&self) -> Result<HealthStatus, TransportError> {
        let response = self.client.get(self.url("/health")).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::api(Operation::Health, status.as_u16(), None));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
