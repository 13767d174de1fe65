//! Provider configuration.

use crate::error::{LlmError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for an OpenAI-compatible chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL of the API, without the `/chat/completions` suffix.
    ///
    /// Examples:
    /// - OpenAI: "https://api.openai.com/v1"
    /// - OpenRouter: "https://openrouter.ai/api/v1"
    /// - A local gateway: "http://localhost:8000/v1"
    pub base_url: String,

    /// Model name/identifier.
    pub model: String,

    /// Request timeout. Applies to the whole HTTP exchange; an expired
    /// timeout surfaces as [`LlmError::Timeout`].
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Organization ID (optional, for providers that support it).
    #[serde(default)]
    pub organization: Option<String>,
}

impl RemoteLlmConfig {
    /// Create a new configuration with the default timeout.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            timeout: default_timeout(),
            organization: None,
        }
    }

    /// Read the API key from an environment variable.
    pub fn from_env(
        env_var: &str,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = std::env::var(env_var)
            .map_err(|_| LlmError::ApiKeyNotFound(format!("environment variable: {env_var}")))?;

        Ok(Self::new(api_key, base_url, model))
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the organization ID.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = RemoteLlmConfig::new("test-key", "https://api.openai.com/v1", "gpt-4o-mini")
            .with_timeout(Duration::from_secs(120))
            .with_organization("org-123");

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.organization, Some("org-123".to_string()));
    }

    #[test]
    fn test_default_timeout() {
        let config = RemoteLlmConfig::new("k", "http://localhost:8000/v1", "m");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_from_env_missing_key() {
        let err = RemoteLlmConfig::from_env("LIBROREC_NO_SUCH_VAR", "url", "model")
            .err()
            .unwrap();
        assert!(matches!(err, LlmError::ApiKeyNotFound(_)));
    }
}
