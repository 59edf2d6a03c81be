use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::{with_store, ApiError};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub ai_enabled: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "online",
        service: "scout-agent",
        version: env!("CARGO_PKG_VERSION"),
        ai_enabled: state.ai_enabled(),
    })
}

/// Every team with at least one recorded series, sorted by name.
pub async fn list_teams(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let teams = with_store(&state, |store| Ok(store.list_teams()?)).await?;
    Ok(Json(teams))
}
