//! Structured logging helpers.
//!
//! Subscriber setup lives in [`crate::cli::serve::init_tracing`]; this
//! module builds the filter directives it uses and the per-request
//! correlation ids attached to the `score` span.

use crate::config::LoggingConfig;
use uuid::Uuid;

/// Build filter directives string from LoggingConfig
///
/// Produces the base level followed by one `scribe::<component>=<level>`
/// directive per entry in `component_levels`, sorted by component name.
///
/// # Examples
///
/// ```
/// use scribe::config::{LogFormat, LoggingConfig};
/// use scribe::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let mut component_levels = HashMap::new();
/// component_levels.insert("dispatch".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(component_levels),
///     log_model_replies: false,
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,scribe::dispatch=debug");
/// ```
pub fn build_filter_directives(config: &LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",scribe::{}={}", component, level));
        }
    }

    filter_str
}

/// Generate a new request ID using UUID v4
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
