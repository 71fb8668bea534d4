//! bedrock-agent-chat: streaming conversational client for Amazon Bedrock Agents.
//!
//! Sends user text to a hosted agent, prints the answer as it streams back,
//! and keeps one conversation session across turns.
//!
//! # Quick Start
//!
//! ```no_run
//! use bedrock_agent_chat::prelude::*;
//!
//! # async fn example() -> bedrock_agent_chat::error::Result<()> {
//! let config = AgentConfig::from_env()?;
//! let runtime = BedrockAgentRuntime::from_config(&config)?;
//! let mut conversation = Conversation::new(runtime, config.agent);
//! let turn = conversation
//!     .run_single("What do tortoises eat?", &mut std::io::stdout())
//!     .await?;
//! println!("{} chars", turn.output.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod eventstream;
pub mod prelude;
pub mod session;
pub mod stream;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
