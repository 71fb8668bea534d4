//! Events streamed back by an agent invocation.

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::AgentError;

/// Event kinds the service tags its stream messages with (`:event-type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum EventKind {
    Chunk,
    Trace,
    ReturnControl,
    Files,
}

/// A piece of the answer. The payload is raw bytes that are expected, but
/// not guaranteed, to be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunk {
    pub bytes: Vec<u8>,
}

impl ContentChunk {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into() }
    }
}

/// Opaque diagnostic payload emitted when tracing is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceRecord(pub serde_json::Value);

impl TraceRecord {
    /// Single-line rendering used on the diagnostic channel.
    pub fn to_line(&self) -> String {
        self.0.to_string()
    }
}

/// One unit of the response stream.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    Chunk(ContentChunk),
    Trace(TraceRecord),
    /// Any event kind this client does not handle; kept so the consumer
    /// can skip it deliberately.
    Unrecognized { kind: String },
}

impl AgentEvent {
    pub fn chunk(text: impl Into<Vec<u8>>) -> Self {
        Self::Chunk(ContentChunk::new(text))
    }

    pub fn trace(value: serde_json::Value) -> Self {
        Self::Trace(TraceRecord(value))
    }
}

/// Lazy, single-pass event sequence of one invocation.
///
/// Ownership enforces the forward-only contract: the consumer takes the
/// stream by value, so a second read cannot be expressed.
pub type EventStream = BoxStream<'static, Result<AgentEvent, AgentError>>;
