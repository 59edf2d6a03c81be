//! SQL Translator Agent.
//!
//! Converts natural-language scouting questions into read-only SQLite
//! queries against the match database. Generated SQL is validated with
//! [`guard_read_only`] before it is ever handed to the store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::backend::{AiBackend, ChatMessage, ChatRequest};
use super::{Agent, AgentError, RetryPolicy};
use crate::storage::guard_read_only;

/// Table and column listing shared by the translation and repair prompts.
pub(crate) const SCHEMA_REFERENCE: &str = "\
- series: series_id, tournament_name, team1_id, team1_name, team2_id, team2_name, winner_team_id, team1_score, team2_score, best_of, started_at, finished
- games: game_id, series_id, game_number, map_name, team1_id, team2_id, team1_score, team2_score, winner_team_id
- game_compositions: game_id, map_name, team_id, team_name, player_name, agent, agent_role
- rounds: game_id, series_id, round_number, attacker_team_id, defender_team_id, winner_team_id, win_type, bomb_planted, is_pistol_round
- player_game_totals: game_id, player_name, team_id, agent, total_kills, total_deaths, total_assists
- weapon_kills: game_id, series_id, round_number, team_id, weapon_name, kill_count";

const TRANSLATOR_RULES: &str = "\
IMPORTANT NOTES:
- winner_team_id is an ID, not a name. To check if a team won, compare winner_team_id to team1_id or team2_id
- For win rate: SUM(CASE WHEN winner_team_id = team1_id AND team1_name = 'TeamName' THEN 1 WHEN winner_team_id = team2_id AND team2_name = 'TeamName' THEN 1 ELSE 0 END)
- Use game_compositions to get team_id from team_name: JOIN game_compositions gc ON ... WHERE gc.team_name = 'TeamName'
- win_type values: opponentEliminated, bombExploded, bombDefused, timeExpired

RULES:
- Return ONLY the SQL, nothing else
- SELECT statements only, never modify data
- Keep queries simple and direct
- Use proper JOINs to connect tables
- LIMIT 25 rows";

/// Input for the SQL Translator agent.
#[derive(Debug, Clone)]
pub struct SqlTranslatorInput {
    /// Natural-language question
    pub question: String,

    /// Team the question is about, if detected
    pub team: Option<String>,
}

/// SQL Translator agent implementation.
pub struct SqlTranslatorAgent {
    backend: Arc<dyn AiBackend>,
}

impl SqlTranslatorAgent {
    pub fn new(backend: Arc<dyn AiBackend>) -> Self {
        Self { backend }
    }

    fn build_prompt(&self, question: &str, team: Option<&str>) -> Vec<ChatMessage> {
        let team_context = team
            .map(|t| {
                format!(
                    "\n\nIMPORTANT: The user is asking about the team '{}'. \
                     Filter queries to include this team.",
                    t
                )
            })
            .unwrap_or_default();

        let system = format!(
            "You are a SQL expert. Generate a simple, working SQLite query.\n\n\
             DATABASE TABLES:\n{}\n\n{}{}",
            SCHEMA_REFERENCE, TRANSLATOR_RULES, team_context
        );

        vec![
            ChatMessage::system(system),
            ChatMessage::user(format!("QUESTION: {}\n\nSQL:", question)),
        ]
    }

    fn clean_and_validate(&self, raw: &str) -> Result<String, AgentError> {
        let sql = strip_sql_fences(raw);
        if sql.is_empty() {
            return Err(AgentError::ResponseParseError(
                "model returned no SQL".to_string(),
            ));
        }
        guard_read_only(&sql)
            .map_err(|e| AgentError::ResponseParseError(format!("generated SQL rejected: {}", e)))?;
        Ok(sql)
    }

    /// Ask the model to correct a query that failed to execute.
    pub async fn repair(
        &self,
        question: &str,
        team: Option<&str>,
        failed_sql: &str,
        error: &str,
    ) -> Result<String, AgentError> {
        info!("Attempting to repair failed SQL");

        let team_context = team
            .map(|t| format!("\nContext: Query is about team '{}'", t))
            .unwrap_or_default();

        let prompt = format!(
            "The following SQL query failed with an error. Fix it.\n\n\
             ### Database Schema:\n{}\n\n\
             ### Original Question:\n{}{}\n\n\
             ### Failed SQL:\n{}\n\n\
             ### Error Message:\n{}\n\n\
             ### Fixed SQL (return ONLY the corrected SQL query, no explanations):",
            SCHEMA_REFERENCE, question, team_context, failed_sql, error
        );

        let request = ChatRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(0.1)
            .with_max_tokens(1024);

        let response = self.backend.chat(request).await?;
        debug!("Repair response: {}", response.content);

        self.clean_and_validate(&response.content)
    }
}

/// Remove markdown code fences the model tends to wrap SQL in.
fn strip_sql_fences(raw: &str) -> String {
    raw.replace("```sql", "").replace("```", "").trim().to_string()
}

#[async_trait]
impl Agent for SqlTranslatorAgent {
    type Input = SqlTranslatorInput;
    type Output = String;

    fn name(&self) -> &'static str {
        "sql_translator"
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output, AgentError> {
        info!("Translating question to SQL: {}", input.question);

        let messages = self.build_prompt(&input.question, input.team.as_deref());
        let request = ChatRequest::new(messages)
            .with_temperature(0.1)
            .with_max_tokens(2048);

        let response = self.backend.chat(request).await?;
        debug!("AI response: {}", response.content);

        self.clean_and_validate(&response.content)
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            initial_delay_ms: 1000,
            backoff_multiplier: 2.0,
        }
    }
}
