//! AI backend abstraction.
//!
//! Supports multiple AI backends:
//! - Local: Ollama (default)
//! - Remote: Groq (feature-flagged)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::AgentError;
use crate::config::AiConfig;

/// Default model when running against Groq.
#[cfg(feature = "remote-ai")]
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// A message in a conversation with the AI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request to the AI backend.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub json_mode: bool,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
            json_mode: false,
        }
    }

    pub fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Response from the AI backend.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
    pub tokens_used: Option<TokenUsage>,
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Trait for AI backends.
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Send a chat completion request.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AgentError>;

    /// Check if the backend is available.
    async fn health_check(&self) -> Result<bool, AgentError>;
}

/// Ollama backend implementation.
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(base_url: String, model: String, timeout_seconds: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url,
            model,
        }
    }
}

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize, Default)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaResponseMessage,
    model: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[async_trait]
impl AiBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AgentError> {
        let url = format!("{}/api/chat", self.base_url);

        let messages: Vec<OllamaMessage> = request
            .messages
            .into_iter()
            .map(|m| OllamaMessage {
                role: match m.role {
                    MessageRole::System => "system".to_string(),
                    MessageRole::User => "user".to_string(),
                    MessageRole::Assistant => "assistant".to_string(),
                },
                content: m.content,
            })
            .collect();

        let ollama_request = OllamaRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            format: if request.json_mode {
                Some("json".to_string())
            } else {
                None
            },
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        debug!("Sending request to Ollama: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| AgentError::BackendUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::BackendUnavailable(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ResponseParseError(e.to_string()))?;

        let tokens_used = match (
            ollama_response.prompt_eval_count,
            ollama_response.eval_count,
        ) {
            (Some(prompt), Some(completion)) => Some(TokenUsage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt + completion,
            }),
            _ => None,
        };

        Ok(ChatResponse {
            content: ollama_response.message.content,
            model: ollama_response.model,
            tokens_used,
        })
    }

    async fn health_check(&self) -> Result<bool, AgentError> {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// --- Groq backend (OpenAI-compatible chat completions) ---

#[cfg(feature = "remote-ai")]
#[derive(Debug, Serialize)]
struct GroqRequest {
    model: String,
    messages: Vec<GroqMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<GroqResponseFormat>,
}

#[cfg(feature = "remote-ai")]
#[derive(Debug, Serialize, Deserialize)]
struct GroqMessage {
    role: String,
    content: String,
}

#[cfg(feature = "remote-ai")]
#[derive(Debug, Serialize)]
struct GroqResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[cfg(feature = "remote-ai")]
#[derive(Debug, Deserialize)]
struct GroqResponse {
    choices: Vec<GroqChoice>,
    model: String,
    #[serde(default)]
    usage: Option<GroqUsage>,
}

#[cfg(feature = "remote-ai")]
#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqChoiceMessage,
}

#[cfg(feature = "remote-ai")]
#[derive(Debug, Deserialize)]
struct GroqChoiceMessage {
    content: String,
}

#[cfg(feature = "remote-ai")]
#[derive(Debug, Deserialize)]
struct GroqUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Groq API backend implementation.
#[cfg(feature = "remote-ai")]
pub struct GroqBackend {
    client: reqwest::Client,
    model: String,
    api_key: String,
}

#[cfg(feature = "remote-ai")]
impl GroqBackend {
    pub fn new(api_key: String, model: String, timeout_seconds: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            model,
            api_key,
        }
    }

    pub fn from_env(model: String, timeout_seconds: u64) -> Result<Self, AgentError> {
        let api_key = std::env::var("GROQ_API_KEY").map_err(|_| {
            AgentError::BackendUnavailable("GROQ_API_KEY env var not set".to_string())
        })?;
        Ok(Self::new(api_key, model, timeout_seconds))
    }
}

#[cfg(feature = "remote-ai")]
#[async_trait]
impl AiBackend for GroqBackend {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AgentError> {
        let url = "https://api.groq.com/openai/v1/chat/completions";

        let messages: Vec<GroqMessage> = request
            .messages
            .into_iter()
            .map(|m| GroqMessage {
                role: match m.role {
                    MessageRole::System => "system".to_string(),
                    MessageRole::User => "user".to_string(),
                    MessageRole::Assistant => "assistant".to_string(),
                },
                content: m.content,
            })
            .collect();

        let groq_request = GroqRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: if request.json_mode {
                Some(GroqResponseFormat {
                    format_type: "json_object".to_string(),
                })
            } else {
                None
            },
        };

        debug!("Sending request to Groq API");

        // Retry loop for rate limiting (429) with exponential backoff
        let max_retries = 5;
        let mut groq_response: Option<GroqResponse> = None;

        for attempt in 0..=max_retries {
            let response = self
                .client
                .post(url)
                .bearer_auth(&self.api_key)
                .json(&groq_request)
                .send()
                .await
                .map_err(|e| AgentError::BackendUnavailable(e.to_string()))?;

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if attempt == max_retries {
                    let body = response.text().await.unwrap_or_default();
                    return Err(AgentError::BackendUnavailable(format!(
                        "Groq API rate limit after {} retries: {}",
                        max_retries, body
                    )));
                }

                // Parse retry-after header, default to exponential backoff
                let wait_secs = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(30 * (1 << attempt)); // 30s, 60s, 120s, 240s...

                warn!(
                    "Rate limited (attempt {}/{}), waiting {}s before retry",
                    attempt + 1,
                    max_retries,
                    wait_secs
                );
                tokio::time::sleep(std::time::Duration::from_secs(wait_secs)).await;
                continue;
            }

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(AgentError::BackendUnavailable(format!(
                    "Groq API returned {}: {}",
                    status, body
                )));
            }

            let body_text = response
                .text()
                .await
                .map_err(|e| AgentError::ResponseParseError(e.to_string()))?;

            match serde_json::from_str::<GroqResponse>(&body_text) {
                Ok(parsed) => {
                    groq_response = Some(parsed);
                    break;
                }
                Err(e) => {
                    warn!(
                        "Failed to parse Groq response: {}. Body: {}",
                        e,
                        &body_text[..body_text.len().min(500)]
                    );
                    return Err(AgentError::ResponseParseError(format!(
                        "Invalid JSON from Groq: {}",
                        e
                    )));
                }
            }
        }

        let groq_response = groq_response
            .ok_or_else(|| AgentError::BackendUnavailable("No response after retries".to_string()))?;

        let content = groq_response
            .choices
            .into_iter()
            .map(|c| c.message.content)
            .collect::<Vec<_>>()
            .join("");

        let tokens_used = groq_response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ChatResponse {
            content,
            model: groq_response.model,
            tokens_used,
        })
    }

    async fn health_check(&self) -> Result<bool, AgentError> {
        let url = "https://api.groq.com/openai/v1/models";

        match self.client.get(url).bearer_auth(&self.api_key).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                warn!("Groq health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

/// Create an AI backend from configuration. `backend = "none"` is handled
/// by the caller; this only builds real backends.
pub fn create_backend(config: &AiConfig) -> Result<std::sync::Arc<dyn AiBackend>, AgentError> {
    match config.backend.as_str() {
        "ollama" => Ok(std::sync::Arc::new(OllamaBackend::new(
            config.base_url.clone(),
            config.model.clone(),
            config.timeout_seconds,
        ))),
        #[cfg(feature = "remote-ai")]
        "groq" => {
            let backend = GroqBackend::from_env(config.model.clone(), config.timeout_seconds)?;
            Ok(std::sync::Arc::new(backend))
        }
        #[cfg(not(feature = "remote-ai"))]
        "groq" => Err(AgentError::BackendUnavailable(
            "groq backend requires the remote-ai feature".to_string(),
        )),
        other => Err(AgentError::BackendUnavailable(format!(
            "unknown AI backend '{}'",
            other
        ))),
    }
}

/// Mock backend for testing. A single response repeats forever; a list
/// is consumed in order with the final entry repeating.
#[cfg(test)]
pub struct MockBackend {
    responses: std::sync::Mutex<std::collections::VecDeque<String>>,
    fail: bool,
}

#[cfg(test)]
impl MockBackend {
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_responses(vec![response.into()])
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into_iter().collect()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            responses: std::sync::Mutex::new(std::collections::VecDeque::new()),
            fail: true,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl AiBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, AgentError> {
        if self.fail {
            return Err(AgentError::BackendUnavailable("mock backend down".to_string()));
        }
        let mut responses = self.responses.lock().unwrap();
        let content = if responses.len() > 1 {
            responses.pop_front().unwrap_or_default()
        } else {
            responses.front().cloned().unwrap_or_default()
        };
        Ok(ChatResponse {
            content,
            model: "mock".to_string(),
            tokens_used: None,
        })
    }

    async fn health_check(&self) -> Result<bool, AgentError> {
        Ok(!self.fail)
    }
}
