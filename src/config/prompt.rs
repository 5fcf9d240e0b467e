//! Prompt template configuration

use serde::{Deserialize, Serialize};

/// Placeholder replaced with the target character.
pub const TARGET_PLACEHOLDER: &str = "{target}";

const DEFAULT_TEMPLATE: &str = "Evaluate the handwritten character '{target}'. \
Check stroke order, stroke shape and overall balance. \
Give a score (0-100) and short feedback. \
Reply with JSON only: {\"score\":number,\"feedback\":string}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptConfig {
    /// Render the instruction text for one target character.
    pub fn render(&self, target: &str) -> String {
        self.template.replace(TARGET_PLACEHOLDER, target)
    }
}
