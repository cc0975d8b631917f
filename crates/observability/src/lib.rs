//! Tracing and logging (shared setup).

use serde::{Deserialize, Serialize};

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Output encoding for log lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// `logging` section of the process configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (e.g. `info`, `taxbridge_infra=debug`).
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(config: &LoggingConfig) {
    tracing::init(config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_section_defaults() {
        let cfg: LoggingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, LoggingConfig::default());

        let cfg: LoggingConfig = serde_json::from_str(r#"{"level":"debug","format":"text"}"#).unwrap();
        assert_eq!(cfg.format, LogFormat::Text);
        assert_eq!(cfg.level, "debug");
    }

    #[test]
    fn init_twice_is_a_no_op() {
        init(&LoggingConfig::default());
        init(&LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Text,
        });
    }
}
