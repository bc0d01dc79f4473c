//! Error types for the agent module.

use thiserror::Error;

/// Errors that can occur during a delegated model call.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model call completed but produced no usable answer.
    #[error("Agent execution failed: {0}")]
    ExecutionFailed(String),

    /// Failed to parse the agent's output into the expected type.
    #[error("Failed to parse agent output: {0}")]
    ParseError(String),

    /// The backing provider could not be reached.
    #[error("Process error: {0}")]
    ProcessError(String),

    /// The provider refused the call because of rate limiting.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A generic error for other cases.
    #[error("Agent error: {0}")]
    Other(String),
}

impl AgentError {
    /// Check if this error is likely to succeed on a later attempt.
    ///
    /// Nothing in this crate retries; the classification is exposed so callers
    /// wrapping an [`Agent`](super::Agent) can decide for themselves.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AgentError::ParseError(_) | AgentError::ProcessError(_) | AgentError::RateLimited(_)
        )
    }
}
