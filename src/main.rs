//! agent-chat binary entry point.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::BufReader;

use bedrock_agent_chat::cli::{configure_logging, Cli, Mode};
use bedrock_agent_chat::client::BedrockAgentRuntime;
use bedrock_agent_chat::config::AgentConfig;
use bedrock_agent_chat::conversation::Conversation;
use bedrock_agent_chat::error::AgentError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    configure_logging(cli.verbose);

    let (config, runtime) = match load_runtime() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Please ensure .env file exists with required variables.");
            return ExitCode::FAILURE;
        }
    };

    let mut conversation = Conversation::new(runtime, config.agent).with_trace(cli.trace);
    if let Some(session) = cli.resume_session() {
        conversation = conversation.with_session(session);
    }

    let mut stdout = std::io::stdout();

    match cli.mode() {
        Mode::Interactive => {
            let stdin = BufReader::new(tokio::io::stdin());
            let result = conversation.run_interactive(stdin, &mut stdout).await;
            let _ = stdout.flush();
            if let Err(e) = result {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
            // The blocking stdin reader cannot be cancelled, so do not wait
            // for runtime shutdown.
            std::process::exit(0);
        }
        Mode::Single(query) => {
            if let Err(e) = conversation.run_single(&query, &mut stdout).await {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn load_runtime() -> Result<(AgentConfig, BedrockAgentRuntime), AgentError> {
    let config = AgentConfig::from_env()?;
    let runtime = BedrockAgentRuntime::from_config(&config)?;
    Ok((config, runtime))
}
