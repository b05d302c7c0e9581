use std::time::Duration;

/// Default API base, matching the service's development bind address.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";

/// Connection settings for [`RedactionApi`](crate::api::RedactionApi).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL including the API prefix, e.g. `http://host:8080/api/v1`.
    pub api_url: String,
    /// Per-request timeout. `None` leaves requests bounded only by the
    /// underlying transport.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
        }
    }
}
