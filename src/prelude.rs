//! Convenience re-exports for common use.

pub use crate::client::{invoke, AgentRuntime, BedrockAgentRuntime, Invocation};
pub use crate::config::AgentConfig;
pub use crate::conversation::{Conversation, LoopState, Step, Turn};
pub use crate::error::{AgentError, Result};
pub use crate::session::SessionId;
pub use crate::stream::{consume, StreamOutcome, TraceSink};
pub use crate::types::{AgentEvent, AgentRef, EventStream};
