//! Configuration module for Scribe
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`SCRIBE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! Credentials are the exception: they are only ever read from the
//! environment variables named in `[credentials]`.
//!
//! # Example
//!
//! ```rust
//! use scribe::config::ScribeConfig;
//!
//! let config = ScribeConfig::default();
//! assert_eq!(config.server.port, 8080);
//!
//! let toml = r#"
//! [upstream]
//! model = "gemini-2.0-flash"
//! "#;
//! let config: ScribeConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.upstream.model, "gemini-2.0-flash");
//! ```

pub mod credentials;
pub mod error;
pub mod logging;
pub mod prompt;
pub mod server;
pub mod upstream;

pub use credentials::CredentialsConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use prompt::PromptConfig;
pub use server::ServerConfig;
pub use upstream::UpstreamConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the Scribe server and CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScribeConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Generative model endpoint
    pub upstream: UpstreamConfig,
    /// Credential pool source
    pub credentials: CredentialsConfig,
    /// Instruction template
    pub prompt: PromptConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ScribeConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports SCRIBE_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("SCRIBE_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("SCRIBE_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("SCRIBE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SCRIBE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(url) = std::env::var("SCRIBE_UPSTREAM_URL") {
            self.upstream.base_url = url;
        }
        if let Ok(model) = std::env::var("SCRIBE_MODEL") {
            self.upstream.model = model;
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "port must be non-zero"));
        }
        if self.server.max_image_bytes == 0 {
            return Err(ConfigError::invalid(
                "server.max_image_bytes",
                "image size bound must be non-zero",
            ));
        }
        if self.server.max_image_bytes > self.server.max_body_bytes {
            return Err(ConfigError::invalid(
                "server.max_image_bytes",
                "image size bound cannot exceed server.max_body_bytes",
            ));
        }

        if self.upstream.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("upstream.base_url", "URL cannot be empty"));
        }
        if self.upstream.model.trim().is_empty() {
            return Err(ConfigError::invalid("upstream.model", "model cannot be empty"));
        }
        if !(0.0..=2.0).contains(&self.upstream.temperature) {
            return Err(ConfigError::invalid(
                "upstream.temperature",
                "temperature must be between 0.0 and 2.0",
            ));
        }
        if self.upstream.timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "upstream.timeout_seconds",
                "timeout must be non-zero",
            ));
        }

        if self.credentials.env.trim().is_empty() {
            return Err(ConfigError::invalid(
                "credentials.env",
                "variable name cannot be empty",
            ));
        }
        if self.credentials.delimiter.is_empty() {
            return Err(ConfigError::invalid(
                "credentials.delimiter",
                "delimiter cannot be empty",
            ));
        }

        if !self.prompt.template.contains(prompt::TARGET_PLACEHOLDER) {
            return Err(ConfigError::invalid(
                "prompt.template",
                format!("template must contain {}", prompt::TARGET_PLACEHOLDER),
            ));
        }

        Ok(())
    }
}
