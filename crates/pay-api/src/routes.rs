//! # Routes
//!
//! Axum router configuration for the synchronous transport.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /, /mcp/metadata - Server metadata and catalog
/// - GET  /health, /mcp/health - Health probe
/// - GET  /mcp/tools - Catalog with count
/// - POST /mcp/request - Dispatch `{tool_name, arguments}`
/// - POST /mcp - Typed envelope (`metadata` or `tool`)
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mcp_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/tools", get(handlers::list_tools))
        .route("/metadata", get(handlers::metadata))
        .route("/request", post(handlers::mcp_request));

    Router::new()
        .route("/", get(handlers::metadata))
        .route("/health", get(handlers::health))
        .route("/mcp", post(handlers::mcp_envelope))
        .nest("/mcp", mcp_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
