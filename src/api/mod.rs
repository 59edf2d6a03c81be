//! REST API endpoints.
//!
//! Axum-based HTTP API for listing teams, serving scouting profiles and
//! their individual sections, and running the natural-language ask
//! pipeline.

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::analytics::ScoutError;
use crate::storage::{ScoutStore, StorageError};

pub mod routes;
pub mod state;

use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ScoutError> for ApiError {
    fn from(err: ScoutError) -> Self {
        match err {
            ScoutError::TeamNotFound(team) => {
                ApiError::NotFound(format!("no series recorded for team '{team}'"))
            }
            ScoutError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Opens the database read-only on the blocking pool and runs `f` against
/// it. The connection lives only for this call; handlers never hold one
/// across an await.
pub(crate) async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&ScoutStore) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let path = state.db_path.as_ref().clone();
    let busy_timeout_ms = state.config.database.busy_timeout_ms;
    tokio::task::spawn_blocking(move || {
        let store = ScoutStore::open_read_only_with_timeout(&path, busy_timeout_ms)?;
        f(&store)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/", get(routes::teams::health))
        .route("/api/teams", get(routes::teams::list_teams))
        .route("/api/scout/:team", get(routes::scout::scout_team))
        .route("/api/overview/:team", get(routes::scout::overview))
        .route("/api/players/:team", get(routes::scout::players))
        .route("/api/compositions/:team", get(routes::scout::compositions))
        .route("/api/weaknesses/:team", get(routes::scout::weaknesses))
        .route("/api/pistol/:team", get(routes::scout::pistol))
        .route("/api/h2h/:team1/:team2", get(routes::scout::h2h))
        .route("/api/ask", post(routes::ask::ask))
        .route("/api/suggestions", get(routes::ask::suggestions))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!(origin, "invalid cors_origin in config, allowing any origin");
            layer.allow_origin(Any)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_not_found_maps_to_404() {
        let err = ApiError::from(ScoutError::TeamNotFound("Fnatic".to_string()));
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.to_string(), "Not found: no series recorded for team 'Fnatic'");
    }

    #[test]
    fn test_storage_errors_map_to_internal() {
        let err = ApiError::from(ScoutError::Storage(StorageError::Timeout));
        assert!(matches!(err, ApiError::Internal(_)));

        let err = ApiError::from(StorageError::Query("no such table".to_string()));
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
