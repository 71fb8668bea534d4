//! Interactive input parsing.

/// What one line of user input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `quit` or `exit`
    Quit,
    /// `new`: start over with a fresh session id
    NewSession,
    /// Blank or whitespace-only input
    Empty,
    /// Anything else is a question for the agent
    Query(String),
}

impl Command {
    /// Keywords are matched case-insensitively after trimming.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Command::Empty;
        }

        match trimmed.to_lowercase().as_str() {
            "quit" | "exit" => Command::Quit,
            "new" => Command::NewSession,
            _ => Command::Query(trimmed.to_string()),
        }
    }

    pub fn help_text() -> &'static str {
        "Type 'quit' or 'exit' to end the conversation.\nType 'new' to start a new session."
    }
}
