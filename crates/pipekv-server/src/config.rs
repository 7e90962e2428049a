//! Configuration management for the pipekv server.
//!
//! Configuration is loaded from three sources, later sources overriding
//! earlier ones:
//! 1. Default values (hardcoded)
//! 2. Configuration file (YAML)
//! 3. Environment variables
//!
//! Environment variables are prefixed with `PIPEKV_` and use `__` as the
//! nested key separator, following the 12-factor app pattern:
//! - `PIPEKV_SERVER__PORT=9090` overrides `server.port`
//! - `PIPEKV_STORAGE__REDIS_URL=redis://cache:6379` overrides `storage.redis_url`

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    /// Server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Storage settings
    #[serde(default)]
    pub storage: StorageSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Server network settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Storage backend settings.
///
/// `backend` selects between the Redis client (`redis`) and the in-memory
/// store (`memory`, useful for demos without a running Redis).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageSettings {
    /// Storage backend: "redis" or "memory"
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Per-command response timeout in seconds
    #[serde(default = "default_response_timeout")]
    pub response_timeout_secs: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            redis_url: default_redis_url(),
            connect_timeout_secs: default_connect_timeout(),
            response_timeout_secs: default_response_timeout(),
        }
    }
}

fn default_backend() -> String {
    "redis".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_response_timeout() -> u64 {
    30
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON-formatted log lines
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Errors from configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    /// The configuration is invalid.
    #[error("invalid configuration: {message}")]
    Invalid { message: String },

    /// Underlying parse or deserialization error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let config = Config::builder()
            .add_source(Config::try_from(&ServerConfig::default())?)
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(
                Environment::with_prefix("PIPEKV")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        Ok(server_config)
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let config = Config::builder()
            .add_source(Config::try_from(&ServerConfig::default())?)
            .add_source(
                Environment::with_prefix("PIPEKV")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        Ok(server_config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.server.port == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        let valid_backends = ["redis", "memory"];
        if !valid_backends.contains(&self.storage.backend.as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "storage.backend must be one of {valid_backends:?}, got '{}'",
                    self.storage.backend
                ),
            });
        }

        if self.storage.backend == "redis" && self.storage.redis_url.is_empty() {
            return Err(ConfigLoadError::Invalid {
                message: "storage.redis_url must not be empty for the redis backend".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    #[serial]
    fn loads_config_from_yaml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 9090

storage:
  backend: memory

logging:
  level: debug
  json: true
"#
        )
        .unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    #[serial]
    fn defaults_apply_when_file_is_partial() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  port: 3000
"#
        )
        .unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.backend, "redis");
        assert_eq!(config.storage.redis_url, "redis://localhost:6379");
    }

    #[test]
    #[serial]
    fn env_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  port: 3000
"#
        )
        .unwrap();

        std::env::set_var("PIPEKV_SERVER__PORT", "4000");
        let config = ServerConfig::load(file.path());
        std::env::remove_var("PIPEKV_SERVER__PORT");

        assert_eq!(config.unwrap().server.port, 4000);
    }

    #[test]
    #[serial]
    fn missing_file_is_an_error() {
        let err = ServerConfig::load("/nonexistent/pipekv.yaml").unwrap_err();
        assert!(matches!(err, ConfigLoadError::FileNotFound { .. }));
    }

    #[test]
    #[serial]
    fn unknown_backend_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
storage:
  backend: cassandra
"#
        )
        .unwrap();

        let err = ServerConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Invalid { .. }));
    }
}
