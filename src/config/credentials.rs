//! Credential source configuration

use serde::{Deserialize, Serialize};

/// Where the credential pool is loaded from.
///
/// Tokens never live in the config file itself; the file only names the
/// environment variables that hold them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Variable holding a delimiter-separated list of keys
    pub env: String,
    /// Single-key variable consulted when `env` is unset or blank
    pub fallback_env: Option<String>,
    pub delimiter: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            env: "GEMINI_API_KEYS".to_string(),
            fallback_env: Some("GEMINI_API_KEY".to_string()),
            delimiter: ",".to_string(),
        }
    }
}

impl CredentialsConfig {
    /// Read the raw credential list from the environment.
    ///
    /// Returns `None` when neither variable holds anything but whitespace.
    pub fn read_env(&self) -> Option<String> {
        self.resolve().map(|(_, raw)| raw)
    }

    /// Like [`read_env`](Self::read_env), also naming the variable used.
    pub fn resolve(&self) -> Option<(&str, String)> {
        std::iter::once(self.env.as_str())
            .chain(self.fallback_env.as_deref())
            .filter_map(|name| std::env::var(name).ok().map(|raw| (name, raw)))
            .find(|(_, raw)| !raw.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_config_defaults() {
        let config = CredentialsConfig::default();
        assert_eq!(config.env, "GEMINI_API_KEYS");
        assert_eq!(config.fallback_env.as_deref(), Some("GEMINI_API_KEY"));
        assert_eq!(config.delimiter, ",");
    }

    #[test]
    fn test_read_env_prefers_primary() {
        let config = CredentialsConfig {
            env: "SCRIBE_TEST_CREDS_PRIMARY".to_string(),
            fallback_env: Some("SCRIBE_TEST_CREDS_PRIMARY_FALLBACK".to_string()),
            delimiter: ",".to_string(),
        };
        std::env::set_var("SCRIBE_TEST_CREDS_PRIMARY", "a,b");
        std::env::set_var("SCRIBE_TEST_CREDS_PRIMARY_FALLBACK", "c");
        let raw = config.read_env();
        std::env::remove_var("SCRIBE_TEST_CREDS_PRIMARY");
        std::env::remove_var("SCRIBE_TEST_CREDS_PRIMARY_FALLBACK");

        assert_eq!(raw.as_deref(), Some("a,b"));
    }

    #[test]
    fn test_read_env_uses_fallback_when_primary_blank() {
        let config = CredentialsConfig {
            env: "SCRIBE_TEST_CREDS_BLANK".to_string(),
            fallback_env: Some("SCRIBE_TEST_CREDS_BLANK_FALLBACK".to_string()),
            delimiter: ",".to_string(),
        };
        std::env::set_var("SCRIBE_TEST_CREDS_BLANK", "   ");
        std::env::set_var("SCRIBE_TEST_CREDS_BLANK_FALLBACK", "solo");
        let raw = config.read_env();
        std::env::remove_var("SCRIBE_TEST_CREDS_BLANK");
        std::env::remove_var("SCRIBE_TEST_CREDS_BLANK_FALLBACK");

        assert_eq!(raw.as_deref(), Some("solo"));
    }

    #[test]
    fn test_resolve_names_variable() {
        let config = CredentialsConfig {
            env: "SCRIBE_TEST_CREDS_RESOLVE".to_string(),
            fallback_env: Some("SCRIBE_TEST_CREDS_RESOLVE_FALLBACK".to_string()),
            delimiter: ",".to_string(),
        };
        std::env::set_var("SCRIBE_TEST_CREDS_RESOLVE_FALLBACK", "k");
        let resolved = config.resolve().map(|(name, _)| name.to_string());
        std::env::remove_var("SCRIBE_TEST_CREDS_RESOLVE_FALLBACK");

        assert_eq!(resolved.as_deref(), Some("SCRIBE_TEST_CREDS_RESOLVE_FALLBACK"));
    }

    #[test]
    fn test_read_env_none_when_unset() {
        let config = CredentialsConfig {
            env: "SCRIBE_TEST_CREDS_UNSET".to_string(),
            fallback_env: None,
            delimiter: ",".to_string(),
        };
        assert!(config.read_env().is_none());
    }
}
