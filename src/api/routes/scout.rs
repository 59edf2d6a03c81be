use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::analytics::compositions::team_compositions;
use crate::analytics::head_to_head::head_to_head;
use crate::analytics::overview::team_overview;
use crate::analytics::pistols::pistol_tendencies;
use crate::analytics::players::player_stats;
use crate::analytics::{build_profile, ScoutError};
use crate::api::state::AppState;
use crate::api::{with_store, ApiError};
use crate::config::AppConfig;
use crate::models::{
    CompositionProfile, HeadToHeadRecord, PistolProfile, PlayerProfile, ScoutingProfile,
    TeamOverview, WeaknessReport,
};
use crate::storage::ScoutStore;

#[derive(Debug, Deserialize)]
pub struct MatchesParams {
    pub matches: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ScoutResponse {
    pub team_name: String,
    pub num_matches: u32,
    pub data: ScoutingProfile,
}

fn clamp_matches(requested: Option<u32>, config: &AppConfig) -> u32 {
    requested
        .unwrap_or(config.scouting.default_matches)
        .clamp(1, config.scouting.max_matches)
}

fn ensure_team(store: &ScoutStore, team: &str) -> Result<(), ApiError> {
    if store.team_exists(team)? {
        Ok(())
    } else {
        Err(ScoutError::TeamNotFound(team.to_string()).into())
    }
}

/// Full scouting profile, every section assembled.
pub async fn scout_team(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(params): Query<MatchesParams>,
) -> Result<Json<ScoutResponse>, ApiError> {
    let matches = clamp_matches(params.matches, &state.config);
    let profile =
        with_store(&state, move |store| Ok(build_profile(store, &team, matches)?)).await?;

    Ok(Json(ScoutResponse {
        team_name: profile.team_name.clone(),
        num_matches: matches,
        data: profile,
    }))
}

pub async fn overview(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(params): Query<MatchesParams>,
) -> Result<Json<TeamOverview>, ApiError> {
    let matches = clamp_matches(params.matches, &state.config);
    let section = with_store(&state, move |store| {
        ensure_team(store, &team)?;
        Ok(team_overview(store, &team, matches)?)
    })
    .await?;
    Ok(Json(section))
}

pub async fn players(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(params): Query<MatchesParams>,
) -> Result<Json<PlayerProfile>, ApiError> {
    let matches = clamp_matches(params.matches, &state.config);
    let section = with_store(&state, move |store| {
        ensure_team(store, &team)?;
        Ok(player_stats(store, &team, matches)?)
    })
    .await?;
    Ok(Json(section))
}

pub async fn compositions(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(params): Query<MatchesParams>,
) -> Result<Json<CompositionProfile>, ApiError> {
    let matches = clamp_matches(params.matches, &state.config);
    let section = with_store(&state, move |store| {
        ensure_team(store, &team)?;
        Ok(team_compositions(store, &team, matches)?)
    })
    .await?;
    Ok(Json(section))
}

/// Weakness detection runs over several assembled sections, so this
/// builds the full profile and returns just the findings.
pub async fn weaknesses(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(params): Query<MatchesParams>,
) -> Result<Json<WeaknessReport>, ApiError> {
    let matches = clamp_matches(params.matches, &state.config);
    let profile =
        with_store(&state, move |store| Ok(build_profile(store, &team, matches)?)).await?;
    Ok(Json(profile.weaknesses))
}

pub async fn pistol(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(params): Query<MatchesParams>,
) -> Result<Json<PistolProfile>, ApiError> {
    let matches = clamp_matches(params.matches, &state.config);
    let section = with_store(&state, move |store| {
        ensure_team(store, &team)?;
        Ok(pistol_tendencies(store, &team, matches)?)
    })
    .await?;
    Ok(Json(section))
}

pub async fn h2h(
    State(state): State<AppState>,
    Path((team1, team2)): Path<(String, String)>,
) -> Result<Json<HeadToHeadRecord>, ApiError> {
    let record = with_store(&state, move |store| {
        ensure_team(store, &team1)?;
        ensure_team(store, &team2)?;
        Ok(head_to_head(store, &team1, &team2)?)
    })
    .await?;
    Ok(Json(record))
}
