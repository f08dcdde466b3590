use clap::{Args, Parser, Subcommand};
use finrag_core::config::CliConfigOverrides;
use std::path::PathBuf;

/// finrag - Conversational question answering over a company's annual filing
#[derive(Parser, Debug)]
#[command(name = "finrag")]
#[command(about = "Ask questions about an annual filing, grounded in retrieved fragments", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// TOML configuration file layered under environment variables
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat(ChatArgs),

    /// Ask a single question and exit
    Ask(AskArgs),

    /// Show the resolved configuration and where each value came from
    Config,
}

/// Pipeline settings that can be overridden per invocation
#[derive(Args, Debug, Default, Clone)]
pub struct PipelineOverrides {
    /// Chat model name
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature (0.0 to 2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Number of fragments to retrieve per question
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Vector index name
    #[arg(long)]
    pub index: Option<String>,
}

impl From<PipelineOverrides> for CliConfigOverrides {
    fn from(args: PipelineOverrides) -> Self {
        Self {
            chat_model: args.model,
            temperature: args.temperature,
            top_k: args.top_k,
            index_name: args.index,
        }
    }
}

#[derive(Parser, Debug)]
pub struct ChatArgs {
    #[command(flatten)]
    pub overrides: PipelineOverrides,
}

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// The question to ask
    pub question: String,

    #[command(flatten)]
    pub overrides: PipelineOverrides,
}
