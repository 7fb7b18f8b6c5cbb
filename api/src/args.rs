use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nutricheck_core::domain::common::{
    DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, LLMConfig, NutricheckConfig,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "nutricheck", version, about = "Food label analysis relay")]
pub struct Args {
    #[command(flatten)]
    pub server: ServerArgs,

    #[command(flatten)]
    pub auth: AuthArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Analyze local image files once and print the result
    Probe(ProbeArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct ProbeArgs {
    #[arg(long, default_value = "analise_individual")]
    pub service: String,

    #[arg(required = true)]
    pub images: Vec<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ServerArgs {
    #[arg(long = "host", env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long = "port", env = "SERVER_PORT", default_value_t = 5000)]
    pub port: u16,

    #[arg(long = "root-path", env = "ROOT_PATH", default_value = "")]
    pub root_path: String,

    #[arg(
        long = "allowed-origins",
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "*"
    )]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct AuthArgs {
    /// Shared secret expected in `Authorization: Bearer <token>`. When empty,
    /// every analysis request is rejected.
    #[arg(
        long = "api-token",
        env = "API_TOKEN",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub api_token: String,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LlmArgs {
    #[arg(
        long = "gemini-api-key",
        env = "GEMINI_API_KEY",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub gemini_api_key: String,

    #[arg(long = "gemini-model", env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    #[arg(
        long = "gemini-base-url",
        env = "GEMINI_BASE_URL",
        default_value = DEFAULT_GEMINI_BASE_URL
    )]
    pub gemini_base_url: String,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    #[arg(long = "log-filter", env = "LOG_FILTER", default_value = "info")]
    pub filter: String,

    #[arg(long = "log-json", env = "LOG_JSON", default_value_t = false)]
    pub json: bool,
}

impl From<Args> for NutricheckConfig {
    fn from(args: Args) -> Self {
        NutricheckConfig {
            llm: LLMConfig {
                gemini_api_key: args.llm.gemini_api_key,
                gemini_model: args.llm.gemini_model,
                gemini_base_url: args.llm.gemini_base_url,
            },
        }
    }
}
