//! Configuration loading and typed config structures for Classpoll.
//!
//! Configuration lives in an optional `classpoll.yaml`. Every field has a
//! default, so an empty file (or no file at all) yields a working server.
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 3000
//! polls:                       # both limits are unset by default
//!   max_duration_seconds: 3600
//!   max_options: 10
//! realtime:
//!   broadcast_capacity: 256
//! logging:
//!   level: info
//! ```

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held a value of the wrong shape.
    #[error("invalid value for {var}: {reason}")]
    InvalidEnv {
        /// The environment variable name.
        var: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level Classpoll configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClasspollConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Limits applied when creating polls.
    #[serde(default)]
    pub polls: PollsConfig,

    /// Realtime fan-out settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ClasspollConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `CLASSPOLL_HOST` overrides `server.host`
    /// - `PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidEnv`] if an override cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.server.apply_env_overrides()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for when no file exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if an override cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::parse("")
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSection {
    /// Apply `CLASSPOLL_HOST` and `PORT` if set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `PORT` is not a valid port.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its
    /// value when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `PORT` is not a valid port.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("CLASSPOLL_HOST") {
            self.host = val;
        }
        if let Some(val) = lookup("PORT") {
            self.port = val.trim().parse().map_err(|e| ConfigError::InvalidEnv {
                var: "PORT",
                reason: format!("{e}"),
            })?;
        }
        Ok(())
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Optional limits applied by the engine when a poll is created.
///
/// Both are unset by default: any positive duration and any number of
/// options from two up is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PollsConfig {
    /// Longest allowed poll, in seconds.
    #[serde(default)]
    pub max_duration_seconds: Option<i64>,

    /// Most options a single poll may carry.
    #[serde(default)]
    pub max_options: Option<usize>,
}

/// Realtime fan-out settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RealtimeConfig {
    /// Buffered messages per subscriber before it starts lagging.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    3000
}

const fn default_broadcast_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ClasspollConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.polls.max_duration_seconds, None);
        assert_eq!(config.polls.max_options, None);
        assert_eq!(config.realtime.broadcast_capacity, 256);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_partial_yaml_keeps_defaults() {
        let yaml = r"
polls:
  max_duration_seconds: 120
logging:
  level: debug
";
        let config: ClasspollConfig = serde_yml::from_str(yaml).unwrap_or_default();
        assert_eq!(config.polls.max_duration_seconds, Some(120));
        assert_eq!(config.polls.max_options, None);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn host_and_port_overrides_apply() {
        let mut server = ServerSection::default();
        let result = server.apply_overrides(|var| match var {
            "CLASSPOLL_HOST" => Some(String::from("127.0.0.1")),
            "PORT" => Some(String::from("8080")),
            _ => None,
        });
        assert!(result.is_ok());
        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.port, 8080);
    }

    #[test]
    fn unset_overrides_keep_values() {
        let mut server = ServerSection::default();
        assert!(server.apply_overrides(|_| None).is_ok());
        assert_eq!(server, ServerSection::default());
    }

    #[test]
    fn bad_port_override_is_invalid_env() {
        let mut server = ServerSection::default();
        let result = server.apply_overrides(|var| (var == "PORT").then(|| String::from("http")));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnv { var: "PORT", .. })
        ));
        assert_eq!(server.port, 3000);

        let result = server.apply_overrides(|var| (var == "PORT").then(|| String::from("70000")));
        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result: Result<ClasspollConfig, _> = serde_yml::from_str("polls: [not, a, map]");
        assert!(result.is_err());
    }
}
