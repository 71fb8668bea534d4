//! Shared test helpers and scripted runtime.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;

use bedrock_agent_chat::client::{AgentRuntime, Invocation};
use bedrock_agent_chat::error::AgentError;
use bedrock_agent_chat::session::SessionId;
use bedrock_agent_chat::stream::TraceSink;
use bedrock_agent_chat::types::{AgentEvent, AgentRef, InvokeRequest, TraceRecord};

/// What the runtime does for one call.
pub enum Script {
    Events(Vec<Result<AgentEvent, AgentError>>),
    /// Deliver these chunks, then never finish.
    Stalled(Vec<Result<AgentEvent, AgentError>>),
    Fail(AgentError),
}

/// A runtime that replays queued scripts and records every request.
pub struct ScriptedRuntime {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<InvokeRequest>>,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response made of text chunks.
    pub fn queue_chunks(&self, chunks: &[&str]) {
        self.queue_events(chunks.iter().map(|c| Ok(AgentEvent::chunk(*c))).collect());
    }

    pub fn queue_events(&self, events: Vec<Result<AgentEvent, AgentError>>) {
        self.scripts.lock().unwrap().push_back(Script::Events(events));
    }

    /// Queue a response that sends `chunks` and then hangs.
    pub fn queue_stalled(&self, chunks: &[&str]) {
        let events = chunks.iter().map(|c| Ok(AgentEvent::chunk(*c))).collect();
        self.scripts.lock().unwrap().push_back(Script::Stalled(events));
    }

    /// Queue a request-level failure (no stream at all).
    pub fn queue_failure(&self, error: AgentError) {
        self.scripts.lock().unwrap().push_back(Script::Fail(error));
    }

    pub fn requests(&self) -> Vec<InvokeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    fn runtime_name(&self) -> &str {
        "scripted"
    }

    async fn invoke_agent(&self, request: &InvokeRequest) -> Result<Invocation, AgentError> {
        self.requests.lock().unwrap().push(request.clone());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Script::Events(vec![Ok(AgentEvent::chunk("Mock response"))]));

        match script {
            Script::Fail(error) => Err(error),
            Script::Events(events) => Ok(Invocation {
                session_id: request.session_id.clone(),
                events: futures::stream::iter(events).boxed(),
            }),
            Script::Stalled(events) => Ok(Invocation {
                session_id: request.session_id.clone(),
                events: futures::stream::iter(events)
                    .chain(futures::stream::pending())
                    .boxed(),
            }),
        }
    }
}

/// An invocation over a fixed list of events.
pub fn invocation(events: Vec<Result<AgentEvent, AgentError>>) -> Invocation {
    Invocation {
        session_id: SessionId::new(),
        events: futures::stream::iter(events).boxed(),
    }
}

/// Trace sink whose records stay readable after it is boxed away.
#[derive(Clone, Default)]
pub struct SharedTraces(pub Arc<Mutex<Vec<TraceRecord>>>);

impl SharedTraces {
    pub fn records(&self) -> Vec<TraceRecord> {
        self.0.lock().unwrap().clone()
    }
}

impl TraceSink for SharedTraces {
    fn emit(&mut self, trace: &TraceRecord) {
        self.0.lock().unwrap().push(trace.clone());
    }
}

pub fn agent() -> AgentRef {
    AgentRef::new("AGENT123", "ALIAS456")
}
