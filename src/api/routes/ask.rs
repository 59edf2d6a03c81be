use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::agents::ask::{detect_team, suggest_questions, AskOutcome};
use crate::api::state::AppState;
use crate::api::{with_store, ApiError};
use crate::storage::ReadOnlyDb;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub team: Option<String>,
}

/// Natural-language question endpoint. Always answers 200 with an
/// [`AskOutcome`]; pipeline failures are reported in its `error` field so
/// clients can show the generated SQL alongside what went wrong.
pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskOutcome>, ApiError> {
    let Some(pipeline) = state.pipeline.clone() else {
        return Ok(Json(AskOutcome {
            question: req.question,
            team: req.team,
            sql: None,
            results: None,
            interpretation: None,
            error: Some("AI backend not configured".to_string()),
        }));
    };

    let team = match req.team {
        Some(team) => Some(team),
        None => {
            let question = req.question.clone();
            with_store(&state, move |store| {
                Ok(detect_team(&question, &store.list_teams()?))
            })
            .await?
        }
    };

    let db = ReadOnlyDb::new(
        state.db_path.as_ref().clone(),
        state.config.database.busy_timeout_ms,
    );
    let outcome = pipeline.ask(&db, &req.question, team).await;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsParams {
    pub team: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

pub async fn suggestions(Query(params): Query<SuggestionsParams>) -> Json<SuggestionsResponse> {
    Json(SuggestionsResponse {
        suggestions: suggest_questions(params.team.as_deref()),
    })
}
