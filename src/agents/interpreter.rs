//! Result Interpreter Agent.
//!
//! Turns raw query results into a short analyst-voiced answer to the
//! original question.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::backend::{AiBackend, ChatMessage, ChatRequest};
use super::{Agent, AgentError};
use crate::storage::TabularResult;

/// Rows handed to the model. Larger results are truncated so the prompt
/// stays small.
const INTERPRETATION_SAMPLE_ROWS: usize = 20;

const INTERPRETER_SYSTEM_PROMPT: &str = "\
You are a VALORANT esports analyst. Based on the data provided, give a concise, \
insightful answer to the question.

Instructions:
1. Answer the question directly and concisely
2. Highlight key statistics and insights
3. Use bullet points for multiple findings
4. Include specific numbers and percentages from the data
5. If relevant, mention tactical implications
6. Keep the response under 200 words";

/// Input for the Result Interpreter agent.
#[derive(Debug, Clone)]
pub struct InterpreterInput {
    /// Question the results answer
    pub question: String,

    /// Team the question was about, if any
    pub team: Option<String>,

    /// Query results to interpret
    pub results: TabularResult,
}

/// Result Interpreter agent implementation.
pub struct ResultInterpreterAgent {
    backend: Arc<dyn AiBackend>,
}

impl ResultInterpreterAgent {
    pub fn new(backend: Arc<dyn AiBackend>) -> Self {
        Self { backend }
    }

    fn build_prompt(&self, input: &InterpreterInput) -> Result<Vec<ChatMessage>, AgentError> {
        let sample = input.results.sample_records(INTERPRETATION_SAMPLE_ROWS);
        let data = serde_json::to_string_pretty(&sample)
            .map_err(|e| AgentError::ResponseParseError(format!("results not serializable: {}", e)))?;

        let team_context = input
            .team
            .as_deref()
            .map(|t| format!(" about {}", t))
            .unwrap_or_default();

        Ok(vec![
            ChatMessage::system(INTERPRETER_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "### Question:\n{}{}\n\n### Data:\n{}\n\n### Analysis:",
                input.question, team_context, data
            )),
        ])
    }
}

#[async_trait]
impl Agent for ResultInterpreterAgent {
    type Input = InterpreterInput;
    type Output = String;

    fn name(&self) -> &'static str {
        "result_interpreter"
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output, AgentError> {
        info!("Interpreting {} result rows", input.results.row_count);

        let messages = self.build_prompt(&input)?;
        let request = ChatRequest::new(messages)
            .with_temperature(0.7)
            .with_max_tokens(500);

        let response = self.backend.chat(request).await?;
        debug!("AI response: {}", response.content);

        Ok(response.content.trim().to_string())
    }
}
