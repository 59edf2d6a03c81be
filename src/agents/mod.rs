//! AI-assisted querying and interpretation.
//!
//! Agents turn natural-language questions into read-only SQL and turn
//! query results back into analyst prose. All agents implement the
//! `Agent` trait and talk to a pluggable [`backend::AiBackend`].

use async_trait::async_trait;
use thiserror::Error;

pub mod ask;
pub mod backend;
pub mod interpreter;
pub mod rate_limit;
pub mod sql_translator;

/// Errors that can occur during agent execution.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("AI backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("AI response unusable: {0}")]
    ResponseParseError(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Retry policy for agents.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Core trait for all AI agents.
#[async_trait]
pub trait Agent {
    type Input;
    type Output;

    /// Agent identifier for logging.
    fn name(&self) -> &'static str;

    /// Execute the agent's task.
    async fn execute(&self, input: Self::Input) -> Result<Self::Output, AgentError>;

    /// Retry policy for this agent.
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
    }
}
