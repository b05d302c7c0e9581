//! `docushield` -- submit documents for PII redaction and collect the results.
//!
//! Usage: `docushield <file>...`
//!
//! Each file is uploaded to the redaction service and tracked until it
//! completes or fails. Redacted files are written to `DOCUSHIELD_OUTPUT_DIR`
//! as `redacted_<filename>`. See [`CliConfig::from_env`] for all settings.
//! Ctrl-C cancels every job still in flight.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docushield_cli::config::CliConfig;
use docushield_cli::run::run;
use docushield_client::RedactionApi;
use docushield_core::settings::InMemorySettingsStore;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = CliConfig::from_env();
    init_tracing(config.as_ref().is_ok_and(|c| c.log_json));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let files: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();

    tracing::info!(
        api_url = %config.client.api_url,
        files = files.len(),
        output_dir = %config.output_dir.display(),
        "Starting docushield",
    );

    let api = match RedactionApi::from_config(&config.client) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };
    let settings_store = InMemorySettingsStore::default();

    match run(&config, &files, Arc::new(api), &settings_store, ctrl_c()).await {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            for failed in &report.failed {
                tracing::error!(filename = %failed.filename, reason = %failed.reason, "Not redacted");
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "docushield_cli=info,docushield_tracker=info,docushield_client=info".into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

/// Resolves on Ctrl-C. Never resolves if the signal cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
