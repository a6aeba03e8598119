//! Population reports.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::HeaderMap,
};
use steward::{SummaryFilter, SummaryReport};

use super::request_context;
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// GET /reports/summary?status=&min_score=&max_score=
pub async fn summary_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    filter: Result<Query<SummaryFilter>, QueryRejection>,
) -> Result<Json<SummaryReport>, ApiError> {
    let ctx = request_context(&headers)?;
    let Query(filter) = filter?;
    Ok(Json(state.steward.summary(&ctx, &filter).await?))
}
