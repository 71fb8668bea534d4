//! Agent runtime trait and the single-request invocation entry point.

pub mod bedrock;
pub mod http;

pub use bedrock::BedrockAgentRuntime;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;
use crate::session::SessionId;
use crate::types::{AgentRef, EventStream, InvokeRequest};

/// A started invocation.
///
/// Holds the session id the service echoed back and the lazy event stream.
/// The stream is single-pass: hand the whole value to
/// [`crate::stream::consume`], or drop it to abandon the remaining events.
pub struct Invocation {
    pub session_id: SessionId,
    pub events: EventStream,
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("session_id", &self.session_id)
            .field("events", &"..")
            .finish()
    }
}

/// Remote service that answers agent invocations.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Runtime name used in logs (e.g., "bedrock").
    fn runtime_name(&self) -> &str;

    /// Send one request. Failures before the stream opens are returned
    /// here; failures while streaming arrive as `Err` items in the stream.
    async fn invoke_agent(&self, request: &InvokeRequest) -> Result<Invocation, AgentError>;
}

#[async_trait]
impl<T: AgentRuntime + ?Sized> AgentRuntime for Arc<T> {
    fn runtime_name(&self) -> &str {
        (**self).runtime_name()
    }

    async fn invoke_agent(&self, request: &InvokeRequest) -> Result<Invocation, AgentError> {
        (**self).invoke_agent(request).await
    }
}

/// Issue one turn to the agent under `session_id`.
///
/// The agent reference is checked for presence and the text must contain
/// something besides whitespace. The session id is passed through as is.
pub async fn invoke<R: AgentRuntime + ?Sized>(
    runtime: &R,
    agent: &AgentRef,
    session_id: &SessionId,
    text: &str,
    trace_enabled: bool,
) -> Result<Invocation, AgentError> {
    agent.validate()?;
    if text.trim().is_empty() {
        return Err(AgentError::InvalidArgument("input text is empty".into()));
    }

    let request = InvokeRequest::builder()
        .agent(agent.clone())
        .session_id(session_id.clone())
        .input_text(text)
        .enable_trace(trace_enabled)
        .build();

    debug!(
        runtime = runtime.runtime_name(),
        agent_id = %agent.agent_id,
        session_id = %session_id,
        trace = trace_enabled,
        "invoking agent"
    );

    runtime.invoke_agent(&request).await
}
