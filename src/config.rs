use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::export::zwo::DEFAULT_AUTHOR;
use crate::logging::LogConfig;

/// Default FTP baseline in watts
pub const DEFAULT_FTP: u16 = 250;

const MIN_FTP: u16 = 50;
const MAX_FTP: u16 = 2000;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Where and how workout files are written
    #[serde(default)]
    pub output: OutputSettings,

    /// Rider the power targets are scaled for
    #[serde(default)]
    pub athlete: AthleteSettings,

    /// Logging setup
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory workout files are saved into
    pub directory: PathBuf,

    /// Value of the `author` element
    pub author: String,

    /// File extension, without the dot
    pub extension: String,
}

/// Athlete settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AthleteSettings {
    /// Functional threshold power in watts
    pub ftp: u16,

    pub name: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            output: OutputSettings::default(),
            athlete: AthleteSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            directory: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Downloads"),
            author: DEFAULT_AUTHOR.to_string(),
            extension: "zwo".to_string(),
        }
    }
}

impl Default for AthleteSettings {
    fn default() -> Self {
        AthleteSettings {
            ftp: DEFAULT_FTP,
            name: None,
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".zwogen")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    ///
    /// A missing file is normal; a file that exists but fails to parse is
    /// reported and replaced by defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Self::default();
        }

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Ignoring config file {}: {:#}", config_path.display(), err);
                Self::default()
            }
        }
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        validate_ftp(self.athlete.ftp)?;

        if self.output.extension.trim().is_empty() {
            anyhow::bail!("Output extension must not be empty");
        }

        Ok(())
    }
}

/// Reject FTP values outside a plausible human range
pub fn validate_ftp(ftp: u16) -> Result<u16> {
    if !(MIN_FTP..=MAX_FTP).contains(&ftp) {
        anyhow::bail!("FTP must be between {} and {} watts, got {}", MIN_FTP, MAX_FTP, ftp);
    }
    Ok(ftp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(deserialized.athlete.ftp, DEFAULT_FTP);
        assert_eq!(deserialized.output.author, "Gravel God Cycling");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let toml_str = r#"
[metadata]
version = "1.0"
created_at = "2024-01-01T00:00:00Z"
updated_at = "2024-01-01T00:00:00Z"

[athlete]
ftp = 310

[logging]
level = "debug"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.athlete.ftp, 310);
        assert_eq!(config.output.extension, "zwo");
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original = AppConfig::default();
        original.athlete.ftp = 280;
        original.output.directory = temp_dir.path().join("out");

        original.save_to_file(&config_path).unwrap();
        let loaded = AppConfig::load_from_file(&config_path).unwrap();

        assert_eq!(loaded.athlete.ftp, 280);
        assert_eq!(loaded.output.directory, temp_dir.path().join("out"));
    }

    #[test]
    fn test_invalid_ftp_rejected() {
        assert!(validate_ftp(250).is_ok());
        assert!(validate_ftp(0).is_err());
        assert!(validate_ftp(5000).is_err());

        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let mut config = AppConfig::default();
        config.athlete.ftp = 10;
        config.save_to_file(&config_path).unwrap();

        assert!(AppConfig::load_from_file(&config_path).is_err());
        assert_eq!(AppConfig::load_or_default(Some(config_path.as_path())).athlete.ftp, DEFAULT_FTP);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config = AppConfig::load_or_default(Some(temp_dir.path().join("absent.toml").as_path()));
        assert_eq!(config.athlete.ftp, DEFAULT_FTP);
    }
}
