use clap::{Args, Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    CHECK_KEY_PROMPT, DEFAULT_GEMINI_URL, ENV_APPLICATION_CREDENTIALS, ENV_CONFIG, ENV_DEV,
    ENV_GEMINI_API_KEY, ENV_GEMINI_API_URL, ENV_GEMINI_TIMEOUT, ENV_HOST, ENV_MAX_COLS, ENV_PORT,
    ENV_PORT_FALLBACK, ENV_SECRET_KEY, ENV_SECRET_KEY_FALLBACK, ENV_SERVICE_ACCOUNT_FILE,
    ENV_USE_API_KEY,
};

#[derive(Parser)]
#[command(name = "treasuremap")]
#[command(version, about = "Travel itinerary planner", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Development mode (allows the ?debug=1 raw output view)
    #[arg(long, global = true, env = ENV_DEV)]
    pub dev: bool,

    /// Gemini generateContent endpoint URL
    #[arg(long, global = true, env = ENV_GEMINI_API_URL)]
    pub gemini_url: Option<String>,

    /// Gemini API key
    #[arg(long, global = true, env = ENV_GEMINI_API_KEY, hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Service-account JSON file for OAuth authentication
    #[arg(long, global = true, env = ENV_SERVICE_ACCOUNT_FILE)]
    pub service_account_file: Option<PathBuf>,

    /// Prefer the API key over OAuth (1/true/yes or 0/false/no)
    #[arg(long, global = true, env = ENV_USE_API_KEY, value_parser = parse_flag)]
    pub use_api_key: Option<bool>,

    /// Gemini request timeout in seconds
    #[arg(long, global = true, env = ENV_GEMINI_TIMEOUT)]
    pub gemini_timeout: Option<u64>,

    /// Maximum columns in the visit roadmap
    #[arg(long, global = true, env = ENV_MAX_COLS)]
    pub max_cols: Option<usize>,

    /// Secret used to sign flash messages
    #[arg(long, global = true, env = ENV_SECRET_KEY, hide_env_values = true)]
    pub secret_key: Option<String>,
}

/// Parse a boolean flag from CLI/env string
fn parse_flag(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(format!(
            "Invalid flag value '{}'. Valid options: 1, true, yes, 0, false, no",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Send a test prompt to check Gemini API key connectivity
    CheckKey(CheckKeyArgs),
}

#[derive(Args, Clone, Debug)]
pub struct CheckKeyArgs {
    /// Full Gemini generateContent URL
    #[arg(long, short = 'u', env = ENV_GEMINI_API_URL, default_value = DEFAULT_GEMINI_URL)]
    pub url: String,

    /// API key to send in the X-Goog-Api-Key header
    #[arg(long, short = 'k', env = ENV_GEMINI_API_KEY, hide_env_values = true)]
    pub key: Option<String>,

    /// Prompt text to send
    #[arg(long, default_value = CHECK_KEY_PROMPT)]
    pub prompt: String,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub dev: bool,
    pub gemini_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub service_account_file: Option<PathBuf>,
    pub use_api_key: Option<bool>,
    pub gemini_timeout: Option<u64>,
    pub max_cols: Option<usize>,
    pub secret_key: Option<String>,
}

/// Non-empty value of a fallback environment variable
fn env_fallback(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let port = cli.port.or_else(|| {
        env_fallback(ENV_PORT_FALLBACK).and_then(|p| match p.trim().parse::<u16>() {
            Ok(port) => Some(port),
            Err(e) => {
                tracing::warn!(value = %p, error = %e, "Ignoring invalid PORT");
                None
            }
        })
    });
    let config = CliConfig {
        host: cli.host,
        port,
        config: cli.config,
        dev: cli.dev,
        gemini_url: cli.gemini_url,
        gemini_api_key: cli.gemini_api_key,
        service_account_file: cli
            .service_account_file
            .or_else(|| env_fallback(ENV_APPLICATION_CREDENTIALS).map(PathBuf::from)),
        use_api_key: cli.use_api_key,
        gemini_timeout: cli.gemini_timeout,
        max_cols: cli.max_cols,
        secret_key: cli
            .secret_key
            .or_else(|| env_fallback(ENV_SECRET_KEY_FALLBACK)),
    };
    (config, cli.command)
}
