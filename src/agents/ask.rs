//! Natural-language question pipeline.
//!
//! Chains the SQL translator and result interpreter around the store:
//! question -> SQL -> execute -> interpret. A failed query gets one
//! repair attempt before the pipeline gives up.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::backend::AiBackend;
use super::interpreter::{InterpreterInput, ResultInterpreterAgent};
use super::rate_limit::RateLimiter;
use super::sql_translator::{SqlTranslatorAgent, SqlTranslatorInput};
use super::Agent;
use crate::storage::{QuerySource, TabularResult};

/// Everything that happened while answering one question. `error` is set
/// instead of returning `Err` so callers can always show partial progress
/// (for example the SQL that failed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskOutcome {
    pub question: String,
    pub team: Option<String>,
    pub sql: Option<String>,
    pub results: Option<TabularResult>,
    pub interpretation: Option<String>,
    pub error: Option<String>,
}

impl AskOutcome {
    fn new(question: &str, team: Option<String>) -> Self {
        Self {
            question: question.to_string(),
            team,
            sql: None,
            results: None,
            interpretation: None,
            error: None,
        }
    }
}

/// Translator and interpreter sharing one backend and one rate limiter.
pub struct AskPipeline {
    translator: SqlTranslatorAgent,
    interpreter: ResultInterpreterAgent,
    limiter: RateLimiter,
}

impl AskPipeline {
    pub fn new(backend: Arc<dyn AiBackend>) -> Self {
        Self {
            translator: SqlTranslatorAgent::new(backend.clone()),
            interpreter: ResultInterpreterAgent::new(backend),
            limiter: RateLimiter::default(),
        }
    }

    pub fn with_min_interval(backend: Arc<dyn AiBackend>, min_interval: Duration) -> Self {
        Self {
            translator: SqlTranslatorAgent::new(backend.clone()),
            interpreter: ResultInterpreterAgent::new(backend),
            limiter: RateLimiter::new(min_interval),
        }
    }

    /// Answer a natural-language question against the database.
    pub async fn ask(
        &self,
        source: &impl QuerySource,
        question: &str,
        team: Option<String>,
    ) -> AskOutcome {
        let mut outcome = AskOutcome::new(question, team.clone());

        self.limiter.wait_ready().await;
        let translated = self
            .translator
            .execute(SqlTranslatorInput {
                question: question.to_string(),
                team: team.clone(),
            })
            .await;

        let sql = match translated {
            Ok(sql) => sql,
            Err(e) => {
                outcome.error = Some(format!("Failed to generate SQL: {}", e));
                return outcome;
            }
        };
        outcome.sql = Some(sql.clone());

        let results = match source.run_query(&sql) {
            Ok(results) => results,
            Err(first_err) => {
                warn!("Generated SQL failed: {}", first_err);

                self.limiter.wait_ready().await;
                let repaired = self
                    .translator
                    .repair(question, team.as_deref(), &sql, &first_err.to_string())
                    .await;

                match repaired {
                    Ok(fixed_sql) => match source.run_query(&fixed_sql) {
                        Ok(results) => {
                            outcome.sql = Some(fixed_sql);
                            results
                        }
                        Err(e) => {
                            outcome.error = Some(format!("SQL execution failed: {}", e));
                            return outcome;
                        }
                    },
                    Err(repair_err) => {
                        warn!("SQL repair failed: {}", repair_err);
                        outcome.error = Some(format!("SQL execution failed: {}", first_err));
                        return outcome;
                    }
                }
            }
        };
        outcome.results = Some(results.clone());

        if !results.is_empty() {
            self.limiter.wait_ready().await;
            let interpreted = self
                .interpreter
                .execute(InterpreterInput {
                    question: question.to_string(),
                    team,
                    results,
                })
                .await;

            match interpreted {
                Ok(text) => outcome.interpretation = Some(text),
                Err(e) => warn!("Interpretation failed, returning raw results: {}", e),
            }
        }

        outcome
    }
}

/// Find which known team a question mentions. Longest match wins so
/// "100 Thieves GC" is preferred over "100 Thieves".
pub fn detect_team(question: &str, teams: &[String]) -> Option<String> {
    let lowered = question.to_lowercase();
    teams
        .iter()
        .filter(|t| lowered.contains(&t.to_lowercase()))
        .max_by_key(|t| t.len())
        .cloned()
}

/// Example questions shown to users, with `team` substituted in when known.
pub fn suggest_questions(team: Option<&str>) -> Vec<String> {
    let team = team.unwrap_or("[team name]");

    vec![
        format!("What is {team}'s win rate on each map?"),
        format!("Who is the best performing player on {team} by KD ratio?"),
        format!("What agents does {team} play most often?"),
        format!("How does {team} perform in pistol rounds?"),
        format!("What is {team}'s post-plant conversion rate?"),
        format!("Show me {team}'s recent match results"),
        format!("Which maps should we ban against {team}?"),
        format!("What compositions does {team} run on Ascent?"),
        format!("Compare {team}'s attack vs defense win rates"),
        format!("What weapons does {team} get the most kills with?"),
        "Which team has the highest overall win rate?".to_string(),
        "What are the most picked agents across all teams?".to_string(),
        "Show head-to-head results between the two finalists".to_string(),
    ]
}
