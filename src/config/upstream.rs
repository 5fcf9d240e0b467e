//! Upstream model configuration

use serde::{Deserialize, Serialize};

/// Settings for the generative model endpoint every evaluation is sent to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL (e.g., "https://generativelanguage.googleapis.com")
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    /// Ask the model for `application/json` output. Replies are parsed
    /// tolerantly either way.
    pub json_mode: bool,
    /// MIME type assumed for images submitted without a data-URI prefix.
    pub default_mime_type: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.1,
            timeout_seconds: 30,
            json_mode: true,
            default_mime_type: "image/jpeg".to_string(),
        }
    }
}
