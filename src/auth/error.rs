use thiserror::Error;

use crate::error::AgentError;

/// Errors raised while resolving credentials or signing a request.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
    #[error("Cannot read shared credentials file {path}: {source}")]
    CredentialsFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Request signing failed: {0}")]
    Signing(String),
}

impl From<AuthError> for AgentError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::MissingCredentials(_) | AuthError::CredentialsFile { .. } => {
                AgentError::Configuration(error.to_string())
            }
            AuthError::Signing(_) => AgentError::Authentication(error.to_string()),
        }
    }
}
