//! Endpoint configuration for the generation collaborator.

use serde::Deserialize;

/// Connection settings for the OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub url: String,
    pub model: String,
    /// Optional bearer token; local endpoints typically need none.
    pub api_key: Option<String>,
    /// Per-call timeout. One attempt per turn, no retry — a slow model is
    /// worse than the fallback response for a user in crisis.
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("HELEN_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:8080/v1".into()),
            model: std::env::var("HELEN_LLM_MODEL").unwrap_or_else(|_| "helen-chat".into()),
            api_key: std::env::var("HELEN_LLM_API_KEY").ok(),
            timeout_secs: std::env::var("HELEN_LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout_is_positive() {
        let config = AgentConfig::default();
        assert!(config.timeout_secs > 0);
        assert!(!config.model.is_empty());
    }
}
