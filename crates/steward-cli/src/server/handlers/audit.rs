//! Audit trail handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::Deserialize;
use steward::audit::AuditEvent;

use super::request_context;
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Query parameters for the audit trail.
#[derive(Debug, Deserialize)]
pub struct AuditParams {
    pub limit: Option<usize>,
}

/// GET /entities/:id/audit
pub async fn get_audit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(entity_id): Path<String>,
    Query(params): Query<AuditParams>,
) -> Result<Json<Vec<AuditEvent>>, ApiError> {
    let ctx = request_context(&headers)?;
    let events = state.steward.audit_for(&ctx, &entity_id, params.limit).await?;
    Ok(Json(events))
}
