//! Console configuration loaded from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use scout_client::{AgentClient, ClientConfig};
use scout_protocol::DEFAULT_ENDPOINT;

use crate::archive::DEFAULT_ARCHIVE_FILE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// URL of the agent's research route.
    pub endpoint: String,
    /// Per-request timeout in seconds. Unset means no timeout.
    pub request_timeout_secs: Option<u64>,
    /// File that `/save` appends results to.
    pub archive_path: PathBuf,
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub log_filter: Option<String>,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: None,
            archive_path: PathBuf::from(DEFAULT_ARCHIVE_FILE),
            log_filter: None,
        }
    }
}

impl ScoutConfig {
    /// Default config location: `<config_dir>/scout/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scout").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), endpoint = %config.endpoint, "Loaded configuration");
        Ok(config)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, endpoint: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        if timeout_secs.is_some() {
            self.request_timeout_secs = timeout_secs;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        self.build_client().map(|_| ())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn build_client(&self) -> Result<AgentClient, ConfigError> {
        AgentClient::new(self.client_config()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn defaults_point_at_local_agent() {
        let config = ScoutConfig::default();
        assert_eq!(config.endpoint, "http://localhost:5001/research");
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.archive_path, PathBuf::from("Research_Output.txt"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_partial_toml_fills_defaults() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "endpoint = \"http://agent.internal:8080/research\"").unwrap();
        writeln!(file, "request_timeout_secs = 30").unwrap();

        let config = ScoutConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.endpoint, "http://agent.internal:8080/research");
        assert_eq!(config.request_timeout_secs, Some(30));
        assert_eq!(config.archive_path, PathBuf::from("Research_Output.txt"));
        assert_eq!(
            config.client_config().request_timeout,
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "endpoint = [[[").unwrap();
        assert!(matches!(
            ScoutConfig::load(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn load_rejects_bad_endpoint() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "endpoint = \"localhost research\"").unwrap();
        assert!(matches!(
            ScoutConfig::load(Some(file.path())),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        assert!(matches!(
            ScoutConfig::load(Some(Path::new("/nonexistent/scout.toml"))),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn overrides_take_precedence() {
        let config = ScoutConfig::default()
            .with_overrides(Some("http://127.0.0.1:9000/research".into()), Some(5));
        assert_eq!(config.endpoint, "http://127.0.0.1:9000/research");
        assert_eq!(config.request_timeout_secs, Some(5));

        let untouched = ScoutConfig::default().with_overrides(None, None);
        assert_eq!(untouched, ScoutConfig::default());
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let config = ScoutConfig::default().with_overrides(None, Some(0));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
