//! Conversation loop: repeated turns against one agent under a held session.
//!
//! The loop is an explicit state machine:
//!
//! ```text
//! AwaitingInput -> Dispatching -> Displaying -> AwaitingInput
//!       |
//!       +-> Ended (end of input, Ctrl-C, quit/exit)
//! ```
//!
//! Blank input and the `new` command stay in `AwaitingInput` without
//! contacting the agent. [`Conversation::step`] drives one transition and
//! is usable without a terminal; [`Conversation::run_interactive`] and
//! [`Conversation::run_single`] wrap it for the two CLI modes.

mod commands;

pub use commands::Command;

use std::future::Future;
use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::client::{invoke, AgentRuntime};
use crate::error::AgentError;
use crate::session::SessionId;
use crate::stream::{consume, StderrTraceSink, TraceSink};
use crate::types::AgentRef;

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingInput,
    Dispatching,
    Displaying,
    Ended,
}

/// One completed request/response exchange.
#[derive(Debug)]
pub struct Turn {
    pub session_id: SessionId,
    pub input: String,
    /// Everything printed as the answer. Incomplete when `error` is set
    /// after the stream had started.
    pub output: String,
    pub error: Option<AgentError>,
}

impl Turn {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// What a single [`Conversation::step`] did.
#[derive(Debug)]
pub enum Step {
    /// Blank input: nothing sent, nothing changed.
    Skipped,
    SessionReset {
        previous: SessionId,
        current: SessionId,
    },
    Turn(Turn),
    Ended,
}

/// Conversation state: the runtime, the target agent and the one active
/// session id.
pub struct Conversation<R> {
    runtime: R,
    agent: AgentRef,
    session: SessionId,
    trace_enabled: bool,
    trace_sink: Box<dyn TraceSink>,
    state: LoopState,
}

impl<R: AgentRuntime> Conversation<R> {
    /// Start a conversation under a freshly generated session id.
    pub fn new(runtime: R, agent: AgentRef) -> Self {
        Self {
            runtime,
            agent,
            session: SessionId::new(),
            trace_enabled: false,
            trace_sink: Box::new(StderrTraceSink),
            state: LoopState::AwaitingInput,
        }
    }

    /// Continue an existing session instead of starting a new one.
    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session = session;
        self
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace_enabled = enabled;
        self
    }

    pub fn with_trace_sink(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.trace_sink = sink;
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Replace the held session id with a fresh one, returning the old id.
    pub fn reset_session(&mut self) -> SessionId {
        let previous = std::mem::replace(&mut self.session, SessionId::new());
        info!(previous = %previous, current = %self.session, "started new session");
        previous
    }

    /// Apply one line of input (`None` for end of input).
    pub async fn step<W: Write>(&mut self, input: Option<&str>, out: &mut W) -> io::Result<Step> {
        if self.state == LoopState::Ended {
            return Ok(Step::Ended);
        }

        let Some(input) = input else {
            writeln!(out, "\nGoodbye!")?;
            self.transition(LoopState::Ended);
            return Ok(Step::Ended);
        };

        match Command::parse(input) {
            Command::Empty => Ok(Step::Skipped),
            Command::Quit => {
                writeln!(out, "Goodbye!")?;
                self.transition(LoopState::Ended);
                Ok(Step::Ended)
            }
            Command::NewSession => {
                let previous = self.reset_session();
                writeln!(out, "\nNew session started: {}\n", self.session)?;
                Ok(Step::SessionReset {
                    previous,
                    current: self.session.clone(),
                })
            }
            Command::Query(text) => {
                let turn = self.dispatch(&text, "\nAgent: ", out).await?;
                if let Some(err) = &turn.error {
                    writeln!(out, "Error: {err} ({})", err.hint())?;
                }
                writeln!(out)?;
                Ok(Step::Turn(turn))
            }
        }
    }

    /// Interactive mode: prompt, read, step, until the loop ends.
    ///
    /// Ctrl-C while waiting for input or while an answer streams ends the
    /// loop cleanly.
    pub async fn run_interactive<I, W>(&mut self, input: I, out: &mut W) -> io::Result<()>
    where
        I: AsyncBufRead + Unpin,
        W: Write,
    {
        let ctrl_c = async {
            let _ = tokio::signal::ctrl_c().await;
        };
        self.run_interactive_until(input, out, ctrl_c).await
    }

    /// [`Self::run_interactive`] with a caller-supplied interrupt. The loop
    /// ends as soon as `interrupt` completes.
    pub async fn run_interactive_until<I, W, S>(
        &mut self,
        input: I,
        out: &mut W,
        interrupt: S,
    ) -> io::Result<()>
    where
        I: AsyncBufRead + Unpin,
        W: Write,
        S: Future<Output = ()>,
    {
        self.print_banner(out)?;
        let mut lines = input.lines();
        tokio::pin!(interrupt);

        while self.state != LoopState::Ended {
            write!(out, "You: ")?;
            out.flush()?;

            let line = tokio::select! {
                line = lines.next_line() => Some(line?),
                () = &mut interrupt => None,
            };
            let Some(line) = line else {
                debug!("interrupted while waiting for input");
                return self.interrupted(out);
            };

            let finished = tokio::select! {
                step = self.step(line.as_deref(), out) => {
                    step?;
                    true
                }
                () = &mut interrupt => false,
            };
            if !finished {
                debug!("interrupted while answering");
                return self.interrupted(out);
            }
        }

        Ok(())
    }

    /// Single-shot mode: exactly one turn, then `Ended`.
    ///
    /// A failed turn is returned as the error so the caller can exit with a
    /// non-zero status.
    pub async fn run_single<W: Write>(&mut self, text: &str, out: &mut W) -> Result<Turn, AgentError> {
        let mut turn = self.dispatch(text, "Agent: ", out).await?;
        self.transition(LoopState::Ended);
        match turn.error.take() {
            Some(err) => Err(err),
            None => Ok(turn),
        }
    }

    async fn dispatch<W: Write>(&mut self, text: &str, prefix: &str, out: &mut W) -> io::Result<Turn> {
        self.transition(LoopState::Dispatching);
        write!(out, "{prefix}")?;
        out.flush()?;

        let session_id = self.session.clone();
        let invocation = invoke(&self.runtime, &self.agent, &session_id, text, self.trace_enabled).await;

        let mut write_error: Option<io::Error> = None;
        let (output, error) = match invocation {
            Ok(invocation) => {
                self.transition(LoopState::Displaying);
                let outcome = consume(
                    invocation,
                    self.trace_enabled,
                    |fragment| {
                        if write_error.is_some() {
                            return;
                        }
                        if let Err(err) = out.write_all(fragment.as_bytes()).and_then(|()| out.flush()) {
                            write_error = Some(err);
                        }
                    },
                    self.trace_sink.as_mut(),
                )
                .await;
                if outcome.session_id != session_id {
                    warn!(
                        sent = %session_id,
                        echoed = %outcome.session_id,
                        "service echoed a different session id; keeping the local one"
                    );
                }
                (outcome.text, outcome.fault)
            }
            Err(err) => (String::new(), Some(err)),
        };

        self.transition(LoopState::AwaitingInput);
        if let Some(err) = write_error {
            return Err(err);
        }
        writeln!(out)?;

        Ok(Turn {
            session_id,
            input: text.to_string(),
            output,
            error,
        })
    }

    fn interrupted<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\nGoodbye!")?;
        self.transition(LoopState::Ended);
        Ok(())
    }

    fn print_banner<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(out, "{rule}")?;
        writeln!(out, "Bedrock Agent - Interactive Mode")?;
        writeln!(out, "{rule}")?;
        writeln!(out, "Session ID: {}", self.session)?;
        writeln!(out, "{}", Command::help_text())?;
        writeln!(out, "{rule}")?;
        writeln!(out)
    }

    fn transition(&mut self, next: LoopState) {
        debug!(from = ?self.state, to = ?next, session_id = %self.session, "conversation state");
        self.state = next;
    }
}
