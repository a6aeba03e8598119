//! Axum application setup.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Entities
        .route("/entities", get(handlers::list_entities))
        .route("/entities/:id", get(handlers::get_entity))
        .route("/entities/:id/validate", post(handlers::validate_entity))
        .route("/entities/:id/decisions", post(handlers::record_decision))
        .route("/entities/:id/audit", get(handlers::get_audit))
        .route("/entities/:id/report", get(handlers::entity_report))
        .route("/entities/:id/compare/:other", get(handlers::compare_entities))
        // Reports
        .route("/reports/summary", get(handlers::summary_report))
        // Ingestion
        .route(
            "/uploads",
            post(handlers::upload_entities).get(handlers::upload_history),
        )
        // Catalog
        .route("/rules", get(handlers::list_rules))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(
    state: AppState,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;

    tracing::info!(addr = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
