//! API request handlers

use super::query::{CommunityParams, EgoParams, RecommendationParams, ShortestPathParams};
use crate::graph::{
    Communities, Connectivity, EgoGraph, GraphError, GraphResult, HobbyCatalog, PersonProfile,
    Recommendations, ShortestPath, SocialGraphEngine,
};
use crate::neo4j::GraphStore;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Shared server state
pub struct ServerState {
    pub store: Arc<dyn GraphStore>,
    pub engine: SocialGraphEngine,
    /// Upper bound for a single request; expiry maps to 504
    pub request_timeout: Duration,
}

/// Shared analyzer state
pub type AnalyzerState = Arc<ServerState>;

impl ServerState {
    /// Await an engine operation, bounded by the request timeout.
    ///
    /// On expiry the operation's token is cancelled and the pending store
    /// call is dropped.
    async fn bounded<T, F>(&self, cancel: &CancellationToken, operation: F) -> Result<T, AppError>
    where
        F: Future<Output = GraphResult<T>>,
    {
        match tokio::time::timeout(self.request_timeout, operation).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => {
                cancel.cancel();
                Err(AppError::Timeout(format!(
                    "request exceeded {}ms",
                    self.request_timeout.as_millis()
                )))
            }
        }
    }
}

// ============================================================================
// Health check
// ============================================================================

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
}

/// Health check handler. Verifies connectivity to the graph store.
///
/// Returns 200 + `"ok"` when the store answers, 503 + `"unhealthy"` otherwise.
pub async fn health(State(state): State<AnalyzerState>) -> (StatusCode, Json<HealthResponse>) {
    let store_ok = state.store.health_check().await.unwrap_or(false);

    let (http_status, status, store) = if store_ok {
        (StatusCode::OK, "ok", "connected")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "disconnected")
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: store.to_string(),
        }),
    )
}

// ============================================================================
// Graph analytics
// ============================================================================

/// Shortest connection path between two people
pub async fn shortest_path(
    State(state): State<AnalyzerState>,
    Path((origin, destination)): Path<(i64, i64)>,
    Query(params): Query<ShortestPathParams>,
) -> Result<Json<ShortestPath>, AppError> {
    params.validate().map_err(AppError::BadRequest)?;

    let cancel = CancellationToken::new();
    let result = state
        .bounded(
            &cancel,
            state.engine.shortest_path(
                state.store.as_ref(),
                &cancel,
                origin,
                destination,
                params.max_depth(),
            ),
        )
        .await?;
    Ok(Json(result))
}

/// Friend-of-friend recommendations
pub async fn recommendations(
    State(state): State<AnalyzerState>,
    Path(user): Path<i64>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<Recommendations>, AppError> {
    params.validate().map_err(AppError::BadRequest)?;

    let cancel = CancellationToken::new();
    let result = state
        .bounded(
            &cancel,
            state.engine.recommendations(
                state.store.as_ref(),
                &cancel,
                user,
                params.limit(),
                params.min_common(),
            ),
        )
        .await?;
    Ok(Json(result))
}

/// Ego network for visualization
pub async fn ego_graph(
    State(state): State<AnalyzerState>,
    Path(user): Path<i64>,
    Query(params): Query<EgoParams>,
) -> Result<Json<EgoGraph>, AppError> {
    params.validate().map_err(AppError::BadRequest)?;

    let cancel = CancellationToken::new();
    let result = state
        .bounded(
            &cancel,
            state.engine.ego_graph(
                state.store.as_ref(),
                &cancel,
                user,
                params.depth(),
                params.max_nodes(),
            ),
        )
        .await?;
    Ok(Json(result))
}

/// Hobby-based communities
pub async fn communities(
    State(state): State<AnalyzerState>,
    Query(params): Query<CommunityParams>,
) -> Result<Json<Communities>, AppError> {
    let cancel = CancellationToken::new();
    let store = state.store.as_ref();
    let result = if params.with_density() {
        state
            .bounded(&cancel, state.engine.communities_with_density(store, &cancel))
            .await?
    } else {
        state
            .bounded(&cancel, state.engine.communities(store, &cancel))
            .await?
    };
    Ok(Json(result))
}

/// Every person's outgoing connections
pub async fn connections(
    State(state): State<AnalyzerState>,
) -> Result<Json<Connectivity>, AppError> {
    let cancel = CancellationToken::new();
    let result = state
        .bounded(&cancel, state.engine.connections(state.store.as_ref(), &cancel))
        .await?;
    Ok(Json(result))
}

// ============================================================================
// Catalog
// ============================================================================

/// Get a person with hobby and connections
pub async fn get_person(
    State(state): State<AnalyzerState>,
    Path(person_id): Path<i64>,
) -> Result<Json<PersonProfile>, AppError> {
    let cancel = CancellationToken::new();
    let result = state
        .bounded(
            &cancel,
            state
                .engine
                .person_profile(state.store.as_ref(), &cancel, person_id),
        )
        .await?;
    Ok(Json(result))
}

/// List hobbies with their categories
pub async fn list_hobbies(
    State(state): State<AnalyzerState>,
) -> Result<Json<HobbyCatalog>, AppError> {
    let cancel = CancellationToken::new();
    let result = state
        .bounded(&cancel, state.engine.hobby_catalog(state.store.as_ref(), &cancel))
        .await?;
    Ok(Json(result))
}

// ============================================================================
// Error handling
// ============================================================================

/// Application error type
#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    NotFound(String),
    BadRequest(String),
    BadGateway(String),
    Timeout(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::BadGateway(msg) => {
                tracing::warn!("Graph store error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<GraphError> for AppError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NotFound(_) => AppError::NotFound(err.to_string()),
            GraphError::Validation { .. } => AppError::BadRequest(err.to_string()),
            GraphError::Decode(e) => AppError::Internal(anyhow::Error::new(e)),
            GraphError::Storage(_) => AppError::BadGateway(err.to_string()),
            GraphError::Cancelled => AppError::Timeout(err.to_string()),
        }
    }
}
