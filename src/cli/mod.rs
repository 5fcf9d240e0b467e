//! CLI module for Scribe
//!
//! # Commands
//!
//! - `serve` - Start the HTTP server
//! - `evaluate` - Score one local image from the command line
//! - `credentials` - Show the credential pool (labels only)
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! export GEMINI_API_KEYS="key-a,key-b"
//! scribe serve --port 8080
//! scribe evaluate --target あ --image sample.png
//! ```

pub mod completions;
pub mod config;
pub mod credentials;
pub mod evaluate;
pub mod output;
pub mod serve;

pub use completions::handle_completions;
pub use config::handle_config_init;
pub use credentials::handle_credentials;
pub use evaluate::handle_evaluate;

use crate::config::ScribeConfig;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Scribe - handwriting evaluation gateway
#[derive(Parser, Debug)]
#[command(
    name = "scribe",
    version,
    about = "Handwriting evaluation gateway with credential failover"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Evaluate a local image once
    Evaluate(EvaluateArgs),
    /// Show the loaded credential pool
    Credentials(CredentialsArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "scribe.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "SCRIBE_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "SCRIBE_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SCRIBE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Character the image is supposed to show
    #[arg(short, long)]
    pub target: String,

    /// Image file to evaluate
    #[arg(short, long)]
    pub image: PathBuf,

    /// MIME type (guessed from the file extension if omitted)
    #[arg(long)]
    pub mime_type: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "scribe.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct CredentialsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "scribe.toml")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "scribe.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load the config file if present, otherwise defaults, then apply env overrides.
pub fn load_config(path: &Path) -> Result<ScribeConfig, Box<dyn std::error::Error>> {
    let config = if path.exists() {
        ScribeConfig::load(Some(path))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        ScribeConfig::default()
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}
