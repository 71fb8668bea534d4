//! Error types for bedrock-agent-chat.

use strum::Display;
use thiserror::Error;

/// Primary error type for all client operations.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Service error: {exception}: {message}")]
    Service { exception: String, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Malformed event stream: {0}")]
    Protocol(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Broad classification of an [`AgentError`], used for user-facing hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    RateLimit,
    Network,
    Server,
    Api,
    Protocol,
    InvalidInput,
}

impl AgentError {
    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited(_) => ErrorCategory::RateLimit,
            Self::Network(_) | Self::Io(_) | Self::Stream(_) => ErrorCategory::Network,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::Service { .. } => ErrorCategory::Server,
            Self::Serialization(_) | Self::Protocol(_) => ErrorCategory::Protocol,
            Self::InvalidArgument(_) => ErrorCategory::InvalidInput,
        }
    }

    /// Short suggestion shown to the operator next to a failed turn.
    pub fn hint(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "check AGENT_ID / AGENT_ALIAS_ID and the config file",
            ErrorCategory::Authentication => "check the AWS credentials in the environment",
            ErrorCategory::RateLimit => "the agent is throttling requests, wait and try again",
            ErrorCategory::Network | ErrorCategory::Server => "try the question again",
            ErrorCategory::Api | ErrorCategory::Protocol => "the service returned an unexpected response",
            ErrorCategory::InvalidInput => "enter a non-empty question",
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AgentError>;
