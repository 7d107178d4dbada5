//! API route definitions

use super::handlers::{self, AnalyzerState};
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: AnalyzerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/api/v1/health", get(handlers::health))
        // ====================================================================
        // Graph analytics
        // ====================================================================
        .route(
            "/api/v1/graph/shortest-path/{origin}/{destination}",
            get(handlers::shortest_path),
        )
        .route(
            "/api/v1/graph/recommendations/{user}",
            get(handlers::recommendations),
        )
        .route("/api/v1/graph/ego/{user}", get(handlers::ego_graph))
        .route("/api/v1/graph/communities", get(handlers::communities))
        .route("/api/v1/graph/connections", get(handlers::connections))
        // ====================================================================
        // Catalog
        // ====================================================================
        .route("/api/v1/persons/{id}", get(handlers::get_person))
        .route("/api/v1/hobbies", get(handlers::list_hobbies))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
