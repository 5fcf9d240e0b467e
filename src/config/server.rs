//! Server configuration

use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for any inbound request body, in bytes.
    pub max_body_bytes: usize,
    /// Upper bound for the decoded image payload, in bytes.
    pub max_image_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_bytes: 10 * 1024 * 1024,
            max_image_bytes: 7 * 1024 * 1024,
        }
    }
}
