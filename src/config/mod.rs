//! Configuration system (layered: env > config file > defaults).

pub mod file;

pub use file::ConfigFile;

use crate::error::AgentError;
use crate::types::AgentRef;

pub const AGENT_ID_VAR: &str = "AGENT_ID";
pub const AGENT_ALIAS_ID_VAR: &str = "AGENT_ALIAS_ID";
pub const REGION_VAR: &str = "AWS_REGION";
pub const ENDPOINT_VAR: &str = "BEDROCK_AGENT_ENDPOINT";

pub const DEFAULT_REGION: &str = "ap-northeast-1";

/// Resolved settings for talking to one agent deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub agent: AgentRef,
    pub region: String,
    /// Overrides the regional service endpoint (VPC endpoints, local stubs).
    pub endpoint: Option<String>,
}

impl AgentConfig {
    /// Load `.env` (if present), the default config file, then the process
    /// environment.
    pub fn from_env() -> Result<Self, AgentError> {
        let _ = dotenvy::dotenv();
        let file = ConfigFile::load_default()?;
        Self::resolve(|key| std::env::var(key).ok(), file)
    }

    /// Merge a variable lookup over a config file.
    ///
    /// Fails with a configuration error naming every missing identifier.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        file: ConfigFile,
    ) -> Result<Self, AgentError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let agent_id = get(AGENT_ID_VAR).or(file.agent_id);
        let agent_alias_id = get(AGENT_ALIAS_ID_VAR).or(file.agent_alias_id);

        let mut missing = Vec::new();
        if agent_id.is_none() {
            missing.push(AGENT_ID_VAR);
        }
        if agent_alias_id.is_none() {
            missing.push(AGENT_ALIAS_ID_VAR);
        }
        let (Some(agent_id), Some(agent_alias_id)) = (agent_id, agent_alias_id) else {
            return Err(AgentError::Configuration(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        };

        Ok(Self {
            agent: AgentRef::new(agent_id, agent_alias_id),
            region: get(REGION_VAR)
                .or(file.region)
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: get(ENDPOINT_VAR).or(file.endpoint),
        })
    }

    /// Base URL of the agent runtime service.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-agent-runtime.{}.amazonaws.com", self.region),
        }
    }
}
