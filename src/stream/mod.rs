//! Stream consumer: demultiplexes an invocation's events into answer text
//! and diagnostic traces.

mod utf8;

pub use utf8::Utf8Decoder;

use futures::StreamExt;
use tracing::{debug, warn};

use crate::client::Invocation;
use crate::error::AgentError;
use crate::session::SessionId;
use crate::types::{AgentEvent, TraceRecord};

/// Destination for trace records, kept apart from the answer text.
pub trait TraceSink {
    fn emit(&mut self, trace: &TraceRecord);
}

/// Writes each trace as a `[TRACE] <json>` line on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrTraceSink;

impl TraceSink for StderrTraceSink {
    fn emit(&mut self, trace: &TraceRecord) {
        eprintln!("\n[TRACE] {}", trace.to_line());
    }
}

impl TraceSink for Vec<TraceRecord> {
    fn emit(&mut self, trace: &TraceRecord) {
        self.push(trace.clone());
    }
}

/// Result of draining one invocation's event stream.
#[derive(Debug)]
pub struct StreamOutcome {
    /// Text assembled from every chunk received, in arrival order.
    pub text: String,
    /// Session id echoed by the service for this invocation.
    pub session_id: SessionId,
    /// Set when the stream failed part way; `text` is then incomplete.
    pub fault: Option<AgentError>,
    pub chunks: usize,
    pub traces: usize,
}

impl StreamOutcome {
    pub fn is_complete(&self) -> bool {
        self.fault.is_none()
    }

    /// The full answer, or the fault if the stream did not finish.
    pub fn into_result(self) -> Result<String, AgentError> {
        match self.fault {
            Some(err) => Err(err),
            None => Ok(self.text),
        }
    }
}

/// Drain an invocation's events in arrival order.
///
/// Every decoded chunk fragment is passed to `on_chunk` as soon as it
/// arrives. Traces go to `trace_sink` only when `trace_enabled` is set and
/// never into the returned text. Unrecognized events are skipped. A stream
/// error stops consumption and is returned as the outcome's `fault`
/// alongside the text received so far.
pub async fn consume<F>(
    invocation: Invocation,
    trace_enabled: bool,
    mut on_chunk: F,
    trace_sink: &mut dyn TraceSink,
) -> StreamOutcome
where
    F: FnMut(&str),
{
    let Invocation {
        session_id,
        mut events,
    } = invocation;

    let mut decoder = Utf8Decoder::new();
    let mut text = String::new();
    let mut fault = None;
    let mut chunks = 0;
    let mut traces = 0;

    while let Some(event) = events.next().await {
        match event {
            Ok(AgentEvent::Chunk(chunk)) => {
                chunks += 1;
                let fragment = decoder.decode(&chunk.bytes);
                if !fragment.is_empty() {
                    on_chunk(&fragment);
                    text.push_str(&fragment);
                }
            }
            Ok(AgentEvent::Trace(trace)) => {
                if trace_enabled {
                    traces += 1;
                    trace_sink.emit(&trace);
                }
            }
            Ok(AgentEvent::Unrecognized { kind }) => {
                debug!(%kind, "skipping unrecognized event");
            }
            Err(err) => {
                warn!(error = %err, received = text.len(), "event stream failed mid-response");
                fault = Some(err);
                break;
            }
        }
    }

    let tail = decoder.finish();
    if !tail.is_empty() {
        on_chunk(&tail);
        text.push_str(&tail);
    }

    debug!(chunks, traces, complete = fault.is_none(), "event stream drained");

    StreamOutcome {
        text,
        session_id,
        fault,
        chunks,
        traces,
    }
}
