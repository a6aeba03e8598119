//! Decision handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::HeaderMap,
};
use steward::{Decision, DecisionInput};

use super::request_context;
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// POST /entities/:id/decisions
///
/// A body that does not parse as a decision is a 400 like any other bad input.
pub async fn record_decision(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(entity_id): Path<String>,
    body: Result<Json<DecisionInput>, JsonRejection>,
) -> Result<Json<Decision>, ApiError> {
    let ctx = request_context(&headers)?;
    let Json(input) = body?;
    let decision = state
        .steward
        .record_decision(&ctx, &entity_id, input)
        .await?;

    state.persist().await;
    Ok(Json(decision))
}
