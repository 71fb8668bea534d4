//! Invocation request types.

use bon::Builder;
use serde::Serialize;

use crate::error::AgentError;
use crate::session::SessionId;

/// Identifies the remote agent and the deployment alias to invoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRef {
    pub agent_id: String,
    pub agent_alias_id: String,
}

impl AgentRef {
    pub fn new(agent_id: impl Into<String>, agent_alias_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_alias_id: agent_alias_id.into(),
        }
    }

    /// Both identifiers must be present. Their format is the service's concern.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.agent_id.trim().is_empty() {
            return Err(AgentError::InvalidArgument("agent id is empty".into()));
        }
        if self.agent_alias_id.trim().is_empty() {
            return Err(AgentError::InvalidArgument("agent alias id is empty".into()));
        }
        Ok(())
    }
}

/// One turn sent to the agent.
#[derive(Debug, Clone, Builder)]
pub struct InvokeRequest {
    pub agent: AgentRef,
    pub session_id: SessionId,
    #[builder(into)]
    pub input_text: String,
    #[builder(default)]
    pub enable_trace: bool,
}

/// JSON body of the `InvokeAgent` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvokeAgentBody<'a> {
    pub input_text: &'a str,
    pub enable_trace: bool,
}

impl InvokeRequest {
    pub(crate) fn body(&self) -> InvokeAgentBody<'_> {
        InvokeAgentBody {
            input_text: &self.input_text,
            enable_trace: self.enable_trace,
        }
    }
}
