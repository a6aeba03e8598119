//! API request handlers.

mod audit;
mod decisions;
mod entities;
mod reports;
mod uploads;

pub use audit::*;
pub use decisions::*;
pub use entities::*;
pub use reports::*;
pub use uploads::*;

use axum::http::HeaderMap;
use steward::audit::RequestMetadata;
use steward::{Actor, RequestContext, Role};

use crate::server::error::ApiError;

/// Header naming the authenticated user.
pub const ACTOR_HEADER: &str = "x-actor";
/// Header carrying the user's role.
pub const ROLE_HEADER: &str = "x-role";

/// Build the caller context from request headers.
///
/// Authentication happens upstream; this layer trusts the identity headers.
pub fn request_context(headers: &HeaderMap) -> Result<RequestContext, ApiError> {
    let username = header(headers, ACTOR_HEADER)
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", ACTOR_HEADER)))?;
    let role: Role = header(headers, ROLE_HEADER)
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", ROLE_HEADER)))?
        .parse()?;

    let caller_address = header(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".into());
    let client = header(headers, "user-agent").unwrap_or_else(|| "unknown".into());

    Ok(RequestContext::new(
        Actor::new(username, role),
        RequestMetadata::new(caller_address, client),
    ))
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
