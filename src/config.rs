use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MementoError, Result};

/// Application configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Locations of the archive files
    pub archive: ArchiveConfig,
    /// Log output settings
    pub logging: LoggingConfig,
    /// Export defaults
    pub export: ExportConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

/// Locations of the archive files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Line-delimited JSON message log
    pub messages_file: PathBuf,
    /// JSON array of contacts
    pub contacts_file: PathBuf,
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Optional rolling log file
    pub file_path: Option<PathBuf>,
    /// "text" or "json"
    pub format: String,
}

/// Export defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// "txt", "csv" or "json"
    pub default_format: String,
    /// Messages per output file
    pub max_lines_per_chunk: usize,
    /// Where chunk files are written
    pub output_directory: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8800,
            },
            archive: ArchiveConfig {
                messages_file: PathBuf::from("data/messages.jsonl"),
                contacts_file: PathBuf::from("data/contacts.json"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            export: ExportConfig {
                default_format: "json".to_string(),
                max_lines_per_chunk: 10_000,
                output_directory: PathBuf::from("./output"),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from the default locations.
    ///
    /// Precedence, lowest first: built-in defaults, `config/default`,
    /// `config/local`, `memento` (any supported extension), then
    /// `MEMENTO__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Like [`load`](Self::load), with an extra explicit file on top of the
    /// optional ones. The explicit file must exist.
    pub fn load_from(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Self::default()
            .into_iter()
            .try_fold(Config::builder(), |builder, (key, value)| builder.set_default(key, value))?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("memento").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(Environment::with_prefix("MEMENTO").separator("__").try_parsing(true))
            .build()
            .map_err(|e| MementoError::InvalidConfig(format!("Failed to load configuration: {e}")))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| MementoError::InvalidConfig(format!("Failed to deserialize configuration: {e}")))?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(MementoError::InvalidConfig("server.host cannot be empty".to_string()));
        }
        if self.server.port == 0 {
            return Err(MementoError::InvalidConfig("server.port must be greater than 0".to_string()));
        }

        if self.archive.messages_file.as_os_str().is_empty() {
            return Err(MementoError::InvalidConfig("archive.messages_file cannot be empty".to_string()));
        }
        if self.archive.contacts_file.as_os_str().is_empty() {
            return Err(MementoError::InvalidConfig("archive.contacts_file cannot be empty".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(MementoError::InvalidConfig(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level, valid_levels
            )));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(MementoError::InvalidConfig(format!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format, valid_formats
            )));
        }

        let valid_exports = ["txt", "csv", "json"];
        if !valid_exports.contains(&self.export.default_format.as_str()) {
            return Err(MementoError::InvalidConfig(format!(
                "Invalid export format: {}. Must be one of: {:?}",
                self.export.default_format, valid_exports
            )));
        }

        if self.export.max_lines_per_chunk == 0 {
            return Err(MementoError::InvalidConfig(
                "export.max_lines_per_chunk must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Replace the log level and validate the result.
    pub fn override_log_level(&mut self, level: &str) -> Result<()> {
        self.logging.level = level.to_string();
        self.validate()
    }

    /// `host:port` to bind the HTTP server to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Render the effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| MementoError::Other(format!("Failed to render configuration: {e}")))
    }
}

impl IntoIterator for AppConfig {
    type Item = (String, config::Value);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        let path = |p: PathBuf| config::Value::from(p.to_string_lossy().into_owned());
        let mut pairs = vec![
            ("server.host".to_string(), config::Value::from(self.server.host)),
            ("server.port".to_string(), config::Value::from(i64::from(self.server.port))),
            ("archive.messages_file".to_string(), path(self.archive.messages_file)),
            ("archive.contacts_file".to_string(), path(self.archive.contacts_file)),
            ("logging.level".to_string(), config::Value::from(self.logging.level)),
            ("logging.format".to_string(), config::Value::from(self.logging.format)),
            ("export.default_format".to_string(), config::Value::from(self.export.default_format)),
            (
                "export.max_lines_per_chunk".to_string(),
                config::Value::from(i64::try_from(self.export.max_lines_per_chunk).unwrap_or(i64::MAX)),
            ),
            ("export.output_directory".to_string(), path(self.export.output_directory)),
        ];
        if let Some(file_path) = self.logging.file_path {
            pairs.push(("logging.file_path".to_string(), path(file_path)));
        }
        pairs.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8800);
        assert_eq!(config.archive.messages_file, PathBuf::from("data/messages.jsonl"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }
}
