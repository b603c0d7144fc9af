use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use skydesk_agent::{SessionConfig, DEFAULT_MAX_TOOL_ROUNDS};
use skydesk_core::SkydeskError;
use skydesk_llm::{LlmConfig, API_KEY_ENV, BASE_URL_ENV, DEFAULT_MODEL, MODEL_ENV};

/// Airline customer support assistant with live flight lookups
#[derive(Parser, Debug)]
#[command(name = "skydesk", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub llm: LlmArgs,

    /// Tool rounds allowed per question before the model must answer
    #[arg(long, default_value_t = DEFAULT_MAX_TOOL_ROUNDS, global = true)]
    pub max_tool_rounds: usize,

    /// Print turn details (phases, tool calls) as JSON after each answer
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug)]
pub struct LlmArgs {
    /// API key for the chat completions endpoint
    #[arg(long, env = API_KEY_ENV, hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(long, env = MODEL_ENV, default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = BASE_URL_ENV, global = true)]
    pub base_url: Option<String>,

    #[arg(long, global = true)]
    pub max_tokens: Option<u32>,

    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60, global = true)]
    pub timeout_secs: u64,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Interactive conversation (default)
    Chat,
    /// Answer a single question and exit
    Ask {
        /// The customer's question
        question: String,
    },
    /// Run a scripted set of sample customer questions
    Demo,
    /// List the flights the assistant can look up (no API key needed)
    Flights,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_max_tool_rounds(self.max_tool_rounds)
            .with_llm_timeout(Duration::from_secs(self.llm.timeout_secs))
    }
}

impl LlmArgs {
    pub fn to_config(&self) -> Result<LlmConfig, SkydeskError> {
        let mut config = LlmConfig::new(self.api_key.clone().unwrap_or_default())?
            .with_model(self.model.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs));

        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if self.max_tokens.is_some() {
            config = config.with_max_tokens(self.max_tokens);
        }
        if self.temperature.is_some() {
            config = config.with_temperature(self.temperature);
        }
        Ok(config)
    }
}
