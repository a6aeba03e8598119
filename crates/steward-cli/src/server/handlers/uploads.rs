//! Bulk upload handlers.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::HeaderMap,
};
use serde::Deserialize;
use serde_json::Value;
use steward::entity::{IngestSummary, UploadSession};

use super::request_context;
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Label used when the caller does not name the batch.
const DEFAULT_SOURCE: &str = "upload";

/// Query parameters for an upload.
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    /// File name or other label for the batch.
    pub source: Option<String>,
}

/// Query parameters for the upload history.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

/// POST /uploads
///
/// Body is a JSON array of upstream records.
pub async fn upload_entities(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<UploadParams>, QueryRejection>,
    body: Result<Json<Vec<Value>>, JsonRejection>,
) -> Result<Json<IngestSummary>, ApiError> {
    let ctx = request_context(&headers)?;
    let Query(params) = params?;
    let Json(records) = body?;

    let source = params.source.as_deref().unwrap_or(DEFAULT_SOURCE);
    let summary = state.steward.ingest(&ctx, source, records).await?;

    state.persist().await;
    Ok(Json(summary))
}

/// GET /uploads
pub async fn upload_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<Vec<UploadSession>>, ApiError> {
    let ctx = request_context(&headers)?;
    let Query(params) = params?;
    Ok(Json(state.steward.upload_history(&ctx, params.limit).await?))
}
