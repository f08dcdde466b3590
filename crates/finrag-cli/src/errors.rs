use console::style;
use finrag_core::FinragError;
use std::fmt;

/// Error with remediation steps, rendered on stderr
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), context: None, suggestions: Vec::new(), help_command: None }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Startup configuration problem
pub fn configuration(error: &FinragError) -> CliError {
    let base = CliError::new("Configuration error").with_context(error.to_string());

    let err = match error {
        FinragError::ConfigMissing { key } => base
            .with_suggestion(format!("Set {}: export {}=...", key, key))
            .with_suggestion("Or add it to a .env file in the current directory"),
        _ => base
            .with_suggestion("Check FINRAG_* environment variables for malformed values")
            .with_suggestion("Check the file passed with --config"),
    };
    err.with_help("Run: finrag config")
}

/// Vector index could not be queried
pub fn retrieval_unavailable(error: &FinragError) -> CliError {
    CliError::new("Cannot reach the document index")
        .with_context(error.to_string())
        .with_suggestion("Check PINECONE_API_KEY and FINRAG_INDEX_NAME")
        .with_suggestion("Set PINECONE_INDEX_HOST to skip the index lookup")
        .with_help("Run: finrag config")
}

/// Language model call failed
pub fn generation_failed(error: &FinragError) -> CliError {
    CliError::new("The language model did not answer")
        .with_context(error.to_string())
        .with_suggestion("Check OPENAI_API_KEY and the chat model name")
        .with_suggestion("Retry in a moment if the provider is rate limiting")
}

/// Map a domain error to its remediation message
pub fn from_finrag(error: &FinragError) -> CliError {
    match error {
        FinragError::RetrievalUnavailable { .. } => retrieval_unavailable(error),
        FinragError::GenerationFailed { .. } => generation_failed(error),
        FinragError::InvalidQuery { .. } => CliError::new("Invalid question")
            .with_context(error.to_string())
            .with_help("Run: finrag ask --help"),
        e if e.is_configuration() => configuration(e),
        e => CliError::new(e.to_string()),
    }
}
