//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML, TOML or JSON, chosen by extension)
//! - Command-line arguments, which override the file per invocation

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use teo_core::schema::DEFAULT_SCHEMA_FILE;
use teo_core::RegistrationPolicy;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema source reference
    pub schema: String,

    /// How duplicate hook names are handled
    pub registration: RegistrationPolicy,

    /// Host identity reported by the demo app
    pub environment: EnvironmentConfig,

    /// Run loop settings
    pub run: RunConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Host language identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Language identifier, e.g. "C", "Go", "Java"
    pub language: String,

    /// Language version
    pub version: String,
}

/// Run loop configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Stop `teo run` after this many seconds; wait for Ctrl-C when unset
    pub timeout_secs: Option<u64>,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output by default
    pub color: bool,

    /// Show a spinner while the app runs
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,

    /// Include thread IDs
    pub thread_ids: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA_FILE.to_string(),
            registration: RegistrationPolicy::default(),
            environment: EnvironmentConfig::default(),
            run: RunConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            language: "Rust".to_string(),
            version: teo_core::VERSION.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress: true,
        }
    }
}

/// Serialization format picked from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Yaml,
    Toml,
    Json,
}

impl FileFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("toml") => FileFormat::Toml,
            _ => FileFormat::Json,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, FileFormat::from_path(path))
    }

    fn parse(content: &str, format: FileFormat) -> Result<Self> {
        let config = match format {
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Toml => toml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading configuration");
                return Self::from_file(&path);
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Get default configuration file paths to check, in priority order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Current directory
        for name in ["teo.yaml", "teo.yml", "teo.toml", "teo.json"] {
            paths.push(PathBuf::from(name));
        }

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let teo_dir = config_dir.join("teo");
            paths.push(teo_dir.join("config.yaml"));
            paths.push(teo_dir.join("config.toml"));
            paths.push(teo_dir.join("config.json"));
        }

        paths
    }

    /// Serialize in the format implied by `path`
    pub fn to_string_for(&self, path: &Path) -> Result<String> {
        let content = match FileFormat::from_path(path) {
            FileFormat::Yaml => serde_yaml::to_string(self)?,
            FileFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
            FileFormat::Json => serde_json::to_string_pretty(self)?,
        };
        Ok(content)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_string_for(path)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.schema, "schema.teo");
        assert_eq!(config.registration, RegistrationPolicy::Overwrite);
        assert_eq!(config.environment.language, "Rust");
        assert!(config.run.timeout_secs.is_none());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "environment:\n  language: C\n  version: 14.0.0\nregistration: reject\n";
        let config = Config::parse(yaml, FileFormat::Yaml).unwrap();
        assert_eq!(config.environment.language, "C");
        assert_eq!(config.environment.version, "14.0.0");
        assert_eq!(config.registration, RegistrationPolicy::Reject);
        assert_eq!(config.schema, "schema.teo");
    }

    #[test]
    fn test_toml_and_json() {
        let toml = "schema = \"app.teo\"\n[run]\ntimeout_secs = 3\n";
        let config = Config::parse(toml, FileFormat::Toml).unwrap();
        assert_eq!(config.schema, "app.teo");
        assert_eq!(config.run.timeout_secs, Some(3));

        let json = r#"{"logging": {"level": "debug", "format": "json"}}"#;
        let config = Config::parse(json, FileFormat::Json).unwrap();
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.logging.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_save_and_reload_each_format() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.environment.language = "Go".into();
        config.run.timeout_secs = Some(10);

        for name in ["teo.yaml", "teo.toml", "teo.json"] {
            let path = dir.path().join("nested").join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), config, "{}", name);
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::from_file(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("teo.toml");
        std::fs::write(&path, "schema = [").unwrap();
        assert!(matches!(Config::from_file(&path).unwrap_err(), Error::Toml(_)));
    }
}
