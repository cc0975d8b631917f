//! Configuration loading and representation.
//!
//! A JSON file provides the baseline; a handful of environment variables
//! override it so secrets need not live on disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use taxbridge_core::{DomainError, LedgerScope};
use taxbridge_observability::LoggingConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

pub const ENV_CMC_KEY: &str = "TAXBRIDGE_CMC_KEY";
pub const ENV_BASE_URL: &str = "TAXBRIDGE_BASE_URL";
pub const ENV_LEDGER_PATH: &str = "TAXBRIDGE_LEDGER_PATH";
pub const ENV_BIND: &str = "TAXBRIDGE_BIND";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tax system connection and device identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(rename = "baseURL", default)]
    pub base_url: String,
    pub tin: String,
    #[serde(rename = "bhfId")]
    pub bhf_id: String,
    #[serde(rename = "cmcKey", default)]
    pub cmc_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "timeoutSecs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SyncConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("data/stock.json")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl AppConfig {
    /// Load from `path`, apply process environment overrides, then validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from `lookup` (the process environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_CMC_KEY) {
            self.api.cmc_key = v;
        }
        if let Some(v) = get(ENV_BASE_URL) {
            self.api.base_url = v;
        }
        if let Some(v) = get(ENV_LEDGER_PATH) {
            self.ledger.path = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_BIND) {
            self.server.bind = v;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scope().map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.sync.timeout_secs == 0 {
            return Err(ConfigError::Invalid("sync.timeoutSecs must be greater than 0".to_string()));
        }
        if self.sync.enabled && self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.baseURL is required when sync is enabled".to_string()));
        }
        if self.sync.enabled && self.api.cmc_key.trim().is_empty() {
            tracing::warn!("{ENV_CMC_KEY} not set; stock master calls will be sent without a CMC key");
        }
        Ok(())
    }

    /// The ledger scope this process serves.
    pub fn scope(&self) -> Result<LedgerScope, DomainError> {
        LedgerScope::parse(&self.api.tin, &self.api.bhf_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use taxbridge_observability::LogFormat;

    const MINIMAL: &str = r#"{"api": {"tin": "P000000001X", "bhfId": "00"}}"#;

    fn parse(json: &str) -> AppConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn minimal_file_gets_defaults() {
        let cfg = parse(MINIMAL);
        cfg.validate().unwrap();
        assert_eq!(cfg.ledger.path, PathBuf::from("data/stock.json"));
        assert!(!cfg.sync.enabled);
        assert_eq!(cfg.sync.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.server.bind, "127.0.0.1:8080");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.scope().unwrap().to_string(), "P000000001X/00");
    }

    #[test]
    fn full_file_parses_wire_names() {
        let cfg = parse(
            r#"{
                "api": {"baseURL": "http://localhost:8088", "tin": "P1", "bhfId": "01", "cmcKey": "k"},
                "logging": {"level": "debug", "format": "text"},
                "ledger": {"path": "/var/lib/taxbridge/stock.json"},
                "sync": {"enabled": true, "timeoutSecs": 5},
                "server": {"bind": "0.0.0.0:9000"}
            }"#,
        );
        cfg.validate().unwrap();
        assert_eq!(cfg.api.base_url, "http://localhost:8088");
        assert_eq!(cfg.logging.format, LogFormat::Text);
        assert_eq!(cfg.sync.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn env_overrides_win_and_blank_values_are_ignored() {
        let mut cfg = parse(MINIMAL);
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_CMC_KEY, "secret"),
            (ENV_LEDGER_PATH, "/tmp/ledger.json"),
            (ENV_BIND, "  "),
        ]);
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.api.cmc_key, "secret");
        assert_eq!(cfg.ledger.path, PathBuf::from("/tmp/ledger.json"));
        assert_eq!(cfg.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let mut cfg = parse(r#"{"api": {"tin": "", "bhfId": "00"}}"#);
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        cfg = parse(MINIMAL);
        cfg.sync.timeout_secs = 0;
        assert!(cfg.validate().is_err());

        cfg = parse(MINIMAL);
        cfg.sync.enabled = true;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::from_file(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
