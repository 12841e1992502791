//! The generation collaborator boundary.
//!
//! One trait, one production impl. The orchestrator only ever sees
//! `Result<String, GenerationError>` — whether the text came from a local
//! model or a cloud endpoint is invisible to the turn pipeline, and tests
//! substitute their own implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use helen_engine::{Message, Sender};

use crate::config::AgentConfig;

/// Why a generation call failed. All variants are recovered locally with the
/// fallback response; none propagate to the user.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("response violated the structured schema")]
    Schema,
}

/// External text-generation service.
///
/// Takes the composed instruction string and the raw message history,
/// returns raw model output. Single attempt per turn — retry policy is a
/// deliberate non-feature here, the caller substitutes a fallback instead.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        instructions: &str,
        history: &[Message],
    ) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    config: AgentConfig,
}

impl OpenAiGenerator {
    pub fn new(config: AgentConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn role_for(sender: Sender) -> &'static str {
        match sender {
            Sender::User => "user",
            Sender::Agent => "assistant",
            Sender::System => "system",
        }
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(
        &self,
        instructions: &str,
        history: &[Message],
    ) -> Result<String, GenerationError> {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: instructions,
        }];
        messages.extend(history.iter().map(|m| ChatMessage {
            role: Self::role_for(m.sender),
            content: &m.text,
        }));

        let url = format!("{}/chat/completions", self.config.url.trim_end_matches('/'));
        debug!(model = %self.config.model, turns = history.len(), "generation call");

        let mut request = self.client.post(&url).json(&ChatRequest {
            model: &self.config.model,
            messages,
        });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::Network(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(GenerationError::Network(format!(
                "endpoint returned {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|_| GenerationError::Schema)?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(GenerationError::Schema)
    }
}
