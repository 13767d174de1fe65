//! Error types for chat model clients.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors raised while talking to a chat completion endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed (connection errors, non-timeout transport
    /// failures).
    #[error("HTTP request failed: {0}")]
    HttpError(reqwest::Error),

    /// API authentication failed (HTTP 401).
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// API key not found in environment.
    #[error("API key not found: {0}")]
    ApiKeyNotFound(String),

    /// Rate limit exceeded (HTTP 429).
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// The provider returned a body we could not interpret.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Any other provider-reported error.
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Client-side configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LlmError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::HttpError(_) | LlmError::Timeout(_) | LlmError::RateLimitExceeded(_)
        )
    }

    /// Whether this is an authentication problem (retrying will not help).
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            LlmError::AuthenticationError(_) | LlmError::ApiKeyNotFound(_)
        )
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(err.to_string())
        } else {
            LlmError::HttpError(err)
        }
    }
}

/// Lets clients satisfy the `ChatModel` trait, whose methods return graph
/// results.
impl From<LlmError> for dialogue_graph::GraphError {
    fn from(err: LlmError) -> Self {
        dialogue_graph::GraphError::Llm(err.to_string())
    }
}
