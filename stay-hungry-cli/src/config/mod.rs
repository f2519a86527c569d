use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub tracker: TrackerConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_tracker_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_heartbeat")]
    pub heartbeat_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_tracker_endpoint() -> String {
    "https://stay-hungry-api.onrender.com/api/analytics/track".to_string()
}

fn default_heartbeat() -> u64 {
    15
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            endpoint: default_tracker_endpoint(),
            heartbeat_seconds: default_heartbeat(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
        }
    }
}

impl TrackerConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_seconds.max(1))
    }
}

impl Config {
    /// Get config directory path (~/.stay-hungry/, or $STAY_HUNGRY_HOME)
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("STAY_HUNGRY_HOME") {
            return Ok(PathBuf::from(home));
        }

        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".stay-hungry"))
    }

    /// Get config file path (~/.stay-hungry/config.toml)
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default file
    pub fn load() -> Result<Self> {
        let config_file = Self::config_file()?;
        Self::load_from(&config_file)
    }

    /// Load configuration from a specific file, falling back to defaults when
    /// it does not exist. `STAY_HUNGRY_API_URL` overrides the API base URL.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&contents).context("Failed to parse config file")?
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            Self::default()
        };

        if let Ok(url) = std::env::var("STAY_HUNGRY_API_URL") {
            if !url.trim().is_empty() {
                config.api.base_url = url;
            }
        }

        Ok(config)
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        let config_file = Self::config_file()?;
        self.save_to(&config_file)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// API base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.timeout_seconds, 30);
        assert!(config.tracker.enabled);
        assert_eq!(config.tracker.heartbeat_interval(), Duration::from_secs(15));
        assert_eq!(config.export.output_dir, ".");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.api.base_url, deserialized.api.base_url);
        assert_eq!(config.tracker.endpoint, deserialized.tracker.endpoint);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "https://api.stayhungry.test/"

            [tracker]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url(), "https://api.stayhungry.test");
        assert_eq!(config.api.timeout_seconds, 30);
        assert!(!config.tracker.enabled);
        assert_eq!(config.tracker.heartbeat_seconds, 15);
    }

    #[test]
    fn test_save_and_load_roundtrip_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.export.output_dir = "/tmp/reports".to_string();
        config.save_to(&path)?;

        let loaded = Config::load_from(&path)?;
        assert_eq!(loaded.export.output_dir, "/tmp/reports");

        Ok(())
    }
}
