//! Command-line surface of `agent-chat`.

use clap::{ArgAction, Parser};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::session::SessionId;

/// Chat with an Amazon Bedrock Agent
#[derive(Parser, Debug)]
#[command(
    name = "agent-chat",
    version,
    about = "Chat with an Amazon Bedrock Agent",
    after_help = "Examples:\n  agent-chat \"What do tortoises eat?\"\n  agent-chat --interactive\n  agent-chat --trace \"How do I set up an enclosure?\""
)]
pub struct Cli {
    /// The question to ask the agent (omit for interactive mode)
    pub query: Option<String>,

    /// Run in interactive conversation mode
    #[arg(short, long)]
    pub interactive: bool,

    /// Print agent trace events to stderr
    #[arg(short, long)]
    pub trace: bool,

    /// Session ID for conversation continuity
    #[arg(short, long)]
    pub session: Option<SessionId>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Which loop the binary runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Single(String),
}

impl Cli {
    pub fn mode(&self) -> Mode {
        match (&self.query, self.interactive) {
            (Some(query), false) => Mode::Single(query.clone()),
            _ => Mode::Interactive,
        }
    }

    /// Session to continue. Only single-shot mode resumes `--session`;
    /// interactive mode always starts fresh.
    pub fn resume_session(&self) -> Option<SessionId> {
        match self.mode() {
            Mode::Single(_) => self.session.clone(),
            Mode::Interactive => None,
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the `-v` level.
pub fn configure_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("off,bedrock_agent_chat={level},agent_chat={level}")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if level < LevelFilter::DEBUG {
        let _ = builder.without_time().compact().try_init();
    } else {
        let _ = builder.compact().try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_query_is_single_mode() {
        let cli = Cli::try_parse_from(["agent-chat", "What do tortoises eat?"]).unwrap();
        assert_eq!(cli.mode(), Mode::Single("What do tortoises eat?".into()));
        assert!(!cli.trace);
        assert!(cli.session.is_none());
    }

    #[test]
    fn no_query_is_interactive() {
        let cli = Cli::try_parse_from(["agent-chat"]).unwrap();
        assert_eq!(cli.mode(), Mode::Interactive);
    }

    #[test]
    fn interactive_flag_wins_over_query() {
        let cli = Cli::try_parse_from(["agent-chat", "-i", "hello"]).unwrap();
        assert_eq!(cli.mode(), Mode::Interactive);
    }

    #[test]
    fn parse_all_options() {
        let cli = Cli::try_parse_from([
            "agent-chat",
            "--trace",
            "--session",
            "abc-123",
            "-vv",
            "How to set up a tortoise enclosure?",
        ])
        .unwrap();
        assert!(cli.trace);
        assert_eq!(cli.session.as_ref().map(|s| s.as_str()), Some("abc-123"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.mode(),
            Mode::Single("How to set up a tortoise enclosure?".into())
        );
    }

    #[test]
    fn session_is_resumed_only_in_single_mode() {
        let single = Cli::try_parse_from(["agent-chat", "-s", "abc-123", "hi"]).unwrap();
        assert_eq!(single.resume_session().map(|s| s.to_string()), Some("abc-123".into()));

        let interactive = Cli::try_parse_from(["agent-chat", "-i", "-s", "abc-123"]).unwrap();
        assert_eq!(interactive.resume_session(), None);
    }

    #[test]
    fn blank_session_is_rejected() {
        assert!(Cli::try_parse_from(["agent-chat", "--session", " ", "hi"]).is_err());
    }
}
