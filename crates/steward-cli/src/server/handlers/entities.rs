//! Entity handlers: listing, view, validation, comparison and reports.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::HeaderMap,
};
use serde::Deserialize;
use steward::store::EntityFilter;
use steward::validation::RuleInfo;
use steward::{Comparison, Entity, EntityReport, EntityStatus, EntityView, ValidationResult};

use super::request_context;
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Default page size for entity listings.
const DEFAULT_LIST_LIMIT: usize = 50;

/// Query parameters for entity listings.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<EntityStatus>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

/// GET /entities
pub async fn list_entities(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Entity>>, ApiError> {
    let ctx = request_context(&headers)?;
    let Query(params) = params?;
    let filter = EntityFilter {
        status: params.status,
        limit: Some(params.limit.unwrap_or(DEFAULT_LIST_LIMIT)),
        offset: params.offset,
    };
    Ok(Json(state.steward.list(&ctx, &filter).await?))
}

/// GET /entities/:id
pub async fn get_entity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(entity_id): Path<String>,
) -> Result<Json<EntityView>, ApiError> {
    let ctx = request_context(&headers)?;
    Ok(Json(state.steward.view(&ctx, &entity_id).await?))
}

/// POST /entities/:id/validate
pub async fn validate_entity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(entity_id): Path<String>,
) -> Result<Json<ValidationResult>, ApiError> {
    let ctx = request_context(&headers)?;
    let result = state.steward.validate(&ctx, &entity_id).await?;

    state.persist().await;
    Ok(Json(result))
}

/// GET /entities/:a/compare/:b
pub async fn compare_entities(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((a, b)): Path<(String, String)>,
) -> Result<Json<Comparison>, ApiError> {
    let ctx = request_context(&headers)?;
    Ok(Json(state.steward.compare(&ctx, &a, &b).await?))
}

/// GET /entities/:id/report
pub async fn entity_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(entity_id): Path<String>,
) -> Result<Json<EntityReport>, ApiError> {
    let ctx = request_context(&headers)?;
    Ok(Json(state.steward.report(&ctx, &entity_id).await?))
}

/// GET /rules
pub async fn list_rules(State(state): State<AppState>) -> Json<Vec<RuleInfo>> {
    Json(state.steward.rules())
}
