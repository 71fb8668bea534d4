use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use super::error::AuthError;
use super::profile::{default_credentials_path, load_profile, DEFAULT_PROFILE};

pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";
pub const PROFILE_VAR: &str = "AWS_PROFILE";
pub const SHARED_CREDENTIALS_FILE_VAR: &str = "AWS_SHARED_CREDENTIALS_FILE";

/// AWS credentials supplied by the hosting environment.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"..")
            .field("session_token", &self.session_token.as_ref().map(|_| ".."))
            .finish()
    }
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Resolve credentials from the process environment: the `AWS_*` key
    /// variables first, then the `AWS_PROFILE` profile (or `default`) in the
    /// shared credentials file.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::resolve(|key| std::env::var(key).ok(), default_credentials_path())
    }

    /// Resolve through an arbitrary variable lookup. `shared_file` is used
    /// unless `AWS_SHARED_CREDENTIALS_FILE` names another file.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        shared_file: Option<PathBuf>,
    ) -> Result<Self, AuthError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let (Some(access_key_id), Some(secret_access_key)) =
            (get(ACCESS_KEY_ID_VAR), get(SECRET_ACCESS_KEY_VAR))
        {
            return Ok(Self {
                access_key_id,
                secret_access_key,
                session_token: get(SESSION_TOKEN_VAR),
            });
        }

        let profile = get(PROFILE_VAR).unwrap_or_else(|| DEFAULT_PROFILE.to_string());
        let path = get(SHARED_CREDENTIALS_FILE_VAR)
            .map(PathBuf::from)
            .or(shared_file);
        if let Some(path) = path {
            if let Some(credentials) = load_profile(&path, &profile)? {
                debug!(profile = %profile, path = %path.display(), "using shared credentials file");
                return Ok(credentials);
            }
        }

        let missing: Vec<&str> = [ACCESS_KEY_ID_VAR, SECRET_ACCESS_KEY_VAR]
            .into_iter()
            .filter(|key| get(key).is_none())
            .collect();
        Err(AuthError::MissingCredentials(format!(
            "{} (no profile '{profile}' in the shared credentials file)",
            missing.join(", ")
        )))
    }
}
