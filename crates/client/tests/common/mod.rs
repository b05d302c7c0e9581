//! In-process mock of the redaction service for HTTP integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Mutable state shared by the mock handlers.
#[derive(Default)]
pub struct MockService {
    /// Job payloads returned by `GET /jobs/{id}`.
    pub jobs: HashMap<String, Value>,
    /// Audit payloads returned by `GET /jobs/{id}/audit`.
    pub audits: HashMap<String, Value>,
    /// Artifacts returned by `GET /jobs/{id}/download`.
    pub artifacts: HashMap<String, Vec<u8>>,
    /// Multipart fields of the last submission, name -> text or file name.
    pub last_upload: HashMap<String, String>,
}

pub type SharedMock = Arc<Mutex<MockService>>;

/// Start the mock on an ephemeral port and return the API base URL.
pub async fn spawn_mock(state: SharedMock) -> String {
    let app = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/redact", post(redact))
        .route("/api/v1/jobs/{id}", get(job_status))
        .route("/api/v1/jobs/{id}/audit", get(job_audit))
        .route("/api/v1/jobs/{id}/download", get(job_download))
        .route("/api/v1/broken/jobs/{id}", get(bare_error))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock listener");
    let addr: SocketAddr = listener.local_addr().expect("mock address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    format!("http://{addr}/api/v1")
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Job not found"}))).into_response()
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "service": "DocuShield AI"}))
}

async fn redact(State(state): State<SharedMock>, mut multipart: Multipart) -> Response {
    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let value = match file_name {
            Some(file_name) => file_name,
            None => field.text().await.unwrap_or_default(),
        };
        fields.insert(name, value);
    }

    let Some(filename) = fields.get("file").cloned() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "No file provided"})),
        )
            .into_response();
    };
    if filename.ends_with(".exe") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Unsupported file type"})),
        )
            .into_response();
    }

    let job_id = uuid::Uuid::new_v4().to_string();
    let mut mock = state.lock().expect("mock lock");
    mock.jobs.insert(
        job_id.clone(),
        json!({
            "id": job_id,
            "filename": filename,
            "status": "queued",
            "created_at": 10.0
        }),
    );
    mock.last_upload = fields;

    Json(json!({
        "job_id": job_id,
        "status": "queued",
        "message": "Document queued for processing"
    }))
    .into_response()
}

async fn job_status(State(state): State<SharedMock>, Path(id): Path<String>) -> Response {
    let mock = state.lock().expect("mock lock");
    match mock.jobs.get(&id) {
        Some(job) => Json(job.clone()).into_response(),
        None => not_found(),
    }
}

async fn job_audit(State(state): State<SharedMock>, Path(id): Path<String>) -> Response {
    let mock = state.lock().expect("mock lock");
    match mock.audits.get(&id) {
        Some(audit) => Json(audit.clone()).into_response(),
        None if mock.jobs.contains_key(&id) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Job not completed"})),
        )
            .into_response(),
        None => not_found(),
    }
}

async fn job_download(State(state): State<SharedMock>, Path(id): Path<String>) -> Response {
    let mock = state.lock().expect("mock lock");
    match mock.artifacts.get(&id) {
        Some(bytes) => bytes.clone().into_response(),
        None => not_found(),
    }
}

/// A 500 with a non-JSON body.
async fn bare_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}
