use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::ingest::LoadSummary;
use crate::output::respond::ChatAnswer;
use crate::server::error::ApiError;
use crate::service::{ChatService, HealthReport};

/// Body of `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The natural-language question.
    pub message: String,
}

/// Query string of `POST /upload-csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadParams {
    /// Target table; defaults to `uploaded_data`.
    #[serde(default = "default_upload_table")]
    pub table_name: String,
}

fn default_upload_table() -> String {
    "uploaded_data".to_string()
}

/// `GET /`
pub async fn root() -> Json<JsonValue> {
    tracing::debug!("root endpoint accessed");
    Json(json!({
        "message": "Chat with Database API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/chat": "POST - Send natural language queries",
            "/upload-csv": "POST - Upload CSV data to create a table",
            "/health": "GET - Health check",
        },
    }))
}

/// `GET /health`
pub async fn health(State(service): State<Arc<ChatService>>) -> Json<HealthReport> {
    tracing::debug!("health endpoint accessed");
    Json(service.health())
}

/// `POST /chat`
///
/// Runs on the request task; the translator call sits between introspection
/// and execution.
pub async fn chat(
    State(service): State<Arc<ChatService>>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatAnswer>, ApiError> {
    let Json(request) = request?;
    let answer = service.answer(&request.message).await?;
    Ok(Json(answer))
}

/// `POST /upload-csv?table_name=<name>` with a multipart `file` field.
pub async fn upload_csv(
    State(service): State<Arc<ChatService>>,
    params: Result<Query<UploadParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<LoadSummary>, ApiError> {
    let Query(params) = params?;
    let mut multipart = multipart?;
    let mut payload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Error processing CSV: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Error processing CSV: {e}")))?;
            payload = Some(bytes);
            break;
        }
    }
    let payload = payload
        .ok_or_else(|| ApiError::bad_request("Error processing CSV: missing 'file' field"))?;

    let table_name = params.table_name;
    let summary = tokio::task::spawn_blocking(move || {
        service.upload_csv(&table_name, payload.as_ref())
    })
    .await
    .map_err(|e| ApiError::internal(format!("Internal server error: {e}")))??;

    Ok(Json(summary))
}
