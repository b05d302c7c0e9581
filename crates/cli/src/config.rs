use std::path::PathBuf;
use std::time::Duration;

use docushield_client::config::DEFAULT_API_URL;
use docushield_client::ClientConfig;
use docushield_tracker::{PollerConfig, RetryPolicy};

/// Invalid configuration value.
#[derive(Debug, thiserror::Error)]
#[error("{var} must be {expected}, got '{value}'")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Binary configuration loaded from environment variables.
///
/// All fields have defaults suitable for a service running locally.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub client: ClientConfig,
    pub poller: PollerConfig,
    /// Directory redacted artifacts are written to (default: `output`).
    pub output_dir: PathBuf,
    /// Where to write the JSON audit report. `None` skips it.
    pub audit_file: Option<PathBuf>,
    /// Emit JSON log lines instead of the human-readable format.
    pub log_json: bool,
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                           | Default                        |
    /// |-----------------------------------|--------------------------------|
    /// | `DOCUSHIELD_API_URL`              | `http://localhost:8080/api/v1` |
    /// | `DOCUSHIELD_POLL_INTERVAL_MS`     | `1000`                         |
    /// | `DOCUSHIELD_COMPLETION_DELAY_MS`  | `500`                          |
    /// | `DOCUSHIELD_STATUS_RETRIES`       | `0`                            |
    /// | `DOCUSHIELD_REQUEST_TIMEOUT_SECS` | `0` (no timeout)               |
    /// | `DOCUSHIELD_OUTPUT_DIR`           | `output`                       |
    /// | `DOCUSHIELD_AUDIT_FILE`           | unset                          |
    /// | `DOCUSHIELD_LOG_JSON`             | `false`                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = non_empty(var("DOCUSHIELD_API_URL")).unwrap_or_else(|| DEFAULT_API_URL.into());

        let poll_interval_ms = parse_u64(&var, "DOCUSHIELD_POLL_INTERVAL_MS", 1000)?;
        if poll_interval_ms == 0 {
            return Err(ConfigError {
                var: "DOCUSHIELD_POLL_INTERVAL_MS",
                value: "0".into(),
                expected: "a positive integer",
            });
        }
        let completion_delay_ms = parse_u64(&var, "DOCUSHIELD_COMPLETION_DELAY_MS", 500)?;
        let status_retries = parse_u64(&var, "DOCUSHIELD_STATUS_RETRIES", 0)?;
        let status_retries = u32::try_from(status_retries).map_err(|_| ConfigError {
            var: "DOCUSHIELD_STATUS_RETRIES",
            value: status_retries.to_string(),
            expected: "a 32-bit unsigned integer",
        })?;
        let request_timeout_secs = parse_u64(&var, "DOCUSHIELD_REQUEST_TIMEOUT_SECS", 0)?;

        let output_dir = non_empty(var("DOCUSHIELD_OUTPUT_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("output"));
        let audit_file = non_empty(var("DOCUSHIELD_AUDIT_FILE")).map(PathBuf::from);
        let log_json = parse_bool(&var, "DOCUSHIELD_LOG_JSON")?;

        Ok(Self {
            client: ClientConfig {
                api_url,
                request_timeout: (request_timeout_secs > 0)
                    .then(|| Duration::from_secs(request_timeout_secs)),
            },
            poller: PollerConfig {
                poll_interval: Duration::from_millis(poll_interval_ms),
                completion_delay: Duration::from_millis(completion_delay_ms),
                retry: RetryPolicy::with_retries(status_retries),
            },
            output_dir,
            audit_file,
            log_json,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_u64(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match non_empty(var(name)) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError {
            var: name,
            value,
            expected: "a non-negative integer",
        }),
    }
}

fn parse_bool(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<bool, ConfigError> {
    match non_empty(var(name)).map(|v| v.to_ascii_lowercase()) {
        None => Ok(false),
        Some(value) => match value.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError {
                var: name,
                value,
                expected: "a boolean",
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<CliConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CliConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.client.api_url, DEFAULT_API_URL);
        assert!(config.client.request_timeout.is_none());
        assert_eq!(config.poller.poll_interval, Duration::from_secs(1));
        assert_eq!(config.poller.completion_delay, Duration::from_millis(500));
        assert!(config.poller.retry.is_fail_fast());
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert!(config.audit_file.is_none());
        assert!(!config.log_json);
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("DOCUSHIELD_API_URL", "http://redact.internal:9000/api/v1"),
            ("DOCUSHIELD_POLL_INTERVAL_MS", "250"),
            ("DOCUSHIELD_COMPLETION_DELAY_MS", "0"),
            ("DOCUSHIELD_STATUS_RETRIES", "3"),
            ("DOCUSHIELD_REQUEST_TIMEOUT_SECS", "30"),
            ("DOCUSHIELD_OUTPUT_DIR", "/tmp/redacted"),
            ("DOCUSHIELD_AUDIT_FILE", "audit.json"),
            ("DOCUSHIELD_LOG_JSON", "TRUE"),
        ])
        .unwrap();
        assert_eq!(config.client.api_url, "http://redact.internal:9000/api/v1");
        assert_eq!(config.client.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.poller.poll_interval, Duration::from_millis(250));
        assert!(config.poller.completion_delay.is_zero());
        assert_eq!(config.poller.retry.max_retries, 3);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/redacted"));
        assert_eq!(config.audit_file, Some(PathBuf::from("audit.json")));
        assert!(config.log_json);
    }

    #[test]
    fn invalid_number_is_an_error() {
        let err = load(&[("DOCUSHIELD_POLL_INTERVAL_MS", "soon")]).unwrap_err();
        assert_eq!(err.var, "DOCUSHIELD_POLL_INTERVAL_MS");
        assert_eq!(
            err.to_string(),
            "DOCUSHIELD_POLL_INTERVAL_MS must be a non-negative integer, got 'soon'"
        );
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = load(&[("DOCUSHIELD_POLL_INTERVAL_MS", "0")]).unwrap_err();
        assert_eq!(err.expected, "a positive integer");
    }

    #[test]
    fn invalid_bool_is_an_error() {
        let err = load(&[("DOCUSHIELD_LOG_JSON", "maybe")]).unwrap_err();
        assert_eq!(err.var, "DOCUSHIELD_LOG_JSON");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[("DOCUSHIELD_API_URL", "  "), ("DOCUSHIELD_AUDIT_FILE", "")]).unwrap();
        assert_eq!(config.client.api_url, DEFAULT_API_URL);
        assert!(config.audit_file.is_none());
    }
}
