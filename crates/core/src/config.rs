//! TOML-based client configuration.
//!
//! The endpoint can be given directly or through an `_env` field naming an
//! environment variable, resolved at runtime via
//! [`ClientConfig::resolve_env_vars`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::enums::{ConflictDetailLevel, ConflictResolutionStrategy};
use crate::errors::{ConfigError, ModelError};
use crate::validation;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level client configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Endpoint, region and transport settings.
    #[serde(default)]
    pub client: ConnectionConfig,

    /// Retry behaviour for idempotent calls.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Values used when a command does not specify them.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// AWS region, e.g. `us-east-1`.
    #[serde(default = "default_region")]
    pub region: String,

    /// Explicit endpoint URL. Derived from the region when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable overriding the endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_env: Option<String>,

    /// Per-call timeout in seconds (default 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Endpoint read from `endpoint_env` (populated by `resolve_env_vars`).
    #[serde(skip)]
    pub resolved_endpoint: Option<String>,
}

fn default_region() -> String {
    "us-east-1".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("codecommit-rs/", env!("CARGO_PKG_VERSION")).into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint: None,
            endpoint_env: None,
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            log_level: default_log_level(),
            resolved_endpoint: None,
        }
    }
}

impl ConnectionConfig {
    /// The endpoint to call: environment override, then explicit value, then
    /// the regional default.
    pub fn endpoint_url(&self) -> String {
        self.resolved_endpoint
            .clone()
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| format!("https://codecommit.{}.amazonaws.com", self.region))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Retry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first (default 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay() -> u64 {
    100
}
fn default_max_delay() -> u64 {
    5_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    #[serde(default)]
    pub conflict_detail_level: ConflictDetailLevel,

    #[serde(default)]
    pub conflict_resolution_strategy: ConflictResolutionStrategy,

    /// Author recorded on merge commits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading & resolving
// ---------------------------------------------------------------------------

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl ClientConfig {
    /// Load a [`ClientConfig`] from a TOML file at the given path.
    ///
    /// This does **not** resolve environment variables -- call
    /// [`resolve_env_vars`](Self::resolve_env_vars) afterwards.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Resolve `*_env` fields from the environment. A missing variable logs
    /// a warning and leaves the explicit value in effect.
    pub fn resolve_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref env_name) = self.client.endpoint_env {
            self.client.resolved_endpoint = resolve_optional_env(env_name, "client.endpoint_env");
        }
        debug!(endpoint = %self.client.endpoint_url(), "environment variable resolution complete");
        Ok(())
    }

    /// Validate that all values are sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client.region.is_empty() {
            return Err(invalid("client.region", "region must not be empty"));
        }
        let endpoint = self.client.endpoint_url();
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(invalid(
                "client.endpoint",
                format!("endpoint must be an http(s) URL, got '{}'", endpoint),
            ));
        }
        if self.client.timeout_secs == 0 {
            return Err(invalid("client.timeout_secs", "timeout must be > 0"));
        }
        if !LOG_LEVELS.contains(&self.client.log_level.as_str()) {
            return Err(invalid(
                "client.log_level",
                format!("expected one of {}", LOG_LEVELS.join(", ")),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "at least one attempt is required"));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(invalid(
                "retry.base_delay_ms",
                "base delay must not exceed max_delay_ms",
            ));
        }
        if let Some(ref repository) = self.defaults.repository {
            validation::repository_name(repository)
                .map_err(|e| from_model("defaults.repository", e))?;
        }
        if let Some(ref name) = self.defaults.author_name {
            validation::author_name(name).map_err(|e| from_model("defaults.author_name", e))?;
        }
        if let Some(ref email) = self.defaults.email {
            validation::email(email).map_err(|e| from_model("defaults.email", e))?;
        }
        Ok(())
    }

    /// Convenience: load, resolve, and validate in one call.
    pub fn load_and_resolve<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.resolve_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// The default configuration rendered as TOML.
    pub fn default_toml() -> Result<String, ConfigError> {
        toml::to_string_pretty(&Self::default()).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

fn invalid(field: &str, detail: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        detail: detail.into(),
    }
}

fn from_model(field: &str, err: ModelError) -> ConfigError {
    invalid(field, err.to_string())
}

/// Try to read an environment variable by name. Returns `Some(value)` on
/// success; logs a warning and returns `None` if the variable is unset.
fn resolve_optional_env(env_name: &str, field: &str) -> Option<String> {
    match std::env::var(env_name) {
        Ok(val) if !val.is_empty() => {
            debug!(field, env_name, "resolved env var");
            Some(val)
        }
        Ok(_) => {
            warn!(field, env_name, "env var is set but empty");
            None
        }
        Err(_) => {
            warn!(field, env_name, "env var not set");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_toml() -> &'static str {
        r#"
[client]
region = "eu-west-1"
timeout_secs = 10
log_level = "debug"

[retry]
max_attempts = 5
base_delay_ms = 50
max_delay_ms = 2000

[defaults]
repository = "demo"
conflict_detail_level = "LINE_LEVEL"
conflict_resolution_strategy = "ACCEPT_SOURCE"
author_name = "Mary Major"
email = "mary@example.com"
"#
    }

    #[test]
    fn test_parse_full_config() {
        let config: ClientConfig = toml::from_str(sample_toml()).expect("failed to parse toml");
        assert_eq!(config.client.region, "eu-west-1");
        assert_eq!(config.client.timeout(), Duration::from_secs(10));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.defaults.repository.as_deref(), Some("demo"));
        assert_eq!(
            config.defaults.conflict_detail_level,
            ConflictDetailLevel::LineLevel
        );
        assert_eq!(
            config.defaults.conflict_resolution_strategy,
            ConflictResolutionStrategy::AcceptSource
        );
        assert_eq!(
            config.client.endpoint_url(),
            "https://codecommit.eu-west-1.amazonaws.com"
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codecommit.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        let config = ClientConfig::load_from_file(&path).expect("load_from_file failed");
        assert_eq!(config.client.log_level, "debug");
    }

    #[test]
    fn test_file_not_found() {
        let result = ClientConfig::load_from_file("/nonexistent/codecommit.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_unknown_enum_literal_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codecommit.toml");
        std::fs::write(
            &path,
            "[defaults]\nconflict_resolution_strategy = \"MERGE_EVERYTHING\"\n",
        )
        .unwrap();
        let result = ClientConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validate_rejects_bad_repository() {
        let mut config: ClientConfig = toml::from_str(sample_toml()).unwrap();
        config.defaults.repository = Some("my repo".into());
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "defaults.repository"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_retry() {
        let mut config = ClientConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.retry.base_delay_ms = 10_000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "retry.base_delay_ms"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_endpoint_and_level() {
        let mut config = ClientConfig::default();
        config.client.endpoint = Some("codecommit.local".into());
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.client.log_level = "loud".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_env_vars() {
        std::env::set_var("TEST_CODECOMMIT_ENDPOINT", "http://localhost:4566");

        let toml_str = r#"
[client]
endpoint = "https://codecommit.example.com"
endpoint_env = "TEST_CODECOMMIT_ENDPOINT"
"#;
        let mut config: ClientConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.client.endpoint_url(), "https://codecommit.example.com");
        config.resolve_env_vars().unwrap();
        assert_eq!(config.client.endpoint_url(), "http://localhost:4566");

        std::env::remove_var("TEST_CODECOMMIT_ENDPOINT");
    }

    #[test]
    fn test_missing_env_keeps_explicit_endpoint() {
        let toml_str = r#"
[client]
endpoint = "https://codecommit.example.com"
endpoint_env = "TEST_CODECOMMIT_ENDPOINT_UNSET"
"#;
        let mut config: ClientConfig = toml::from_str(toml_str).unwrap();
        config.resolve_env_vars().unwrap();
        assert_eq!(config.client.endpoint_url(), "https://codecommit.example.com");
    }

    #[test]
    fn test_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.client.region, "us-east-1");
        assert_eq!(config.client.timeout_secs, 30);
        assert_eq!(config.client.log_level, "info");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(
            config.defaults.conflict_detail_level,
            ConflictDetailLevel::FileLevel
        );
        assert_eq!(
            config.defaults.conflict_resolution_strategy,
            ConflictResolutionStrategy::None
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_default_toml_round_trips() {
        let rendered = ClientConfig::default_toml().unwrap();
        assert!(rendered.contains("conflict_detail_level = \"FILE_LEVEL\""));
        let config: ClientConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(config.client.region, "us-east-1");
    }
}
