use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::{AppConfig, DomainError};
use crate::ports::ConfigStore;

const APP_DIR: &str = "Arogya";
const CONFIG_FILE: &str = "config.toml";

/// TOML-based configuration store with OS-specific paths.
pub struct TomlConfigStore {
    data_dir: PathBuf,
}

impl TomlConfigStore {
    /// Create a store in the OS-specific application data directory.
    /// - macOS: ~/Library/Application Support/Arogya/
    /// - Windows: %APPDATA%\Arogya\
    /// - Linux: ~/.config/Arogya/
    pub fn new() -> Result<Self, DomainError> {
        let data_dir = if cfg!(target_os = "macos") {
            dirs::data_dir()
        } else {
            dirs::config_dir()
        }
        .map(|p| p.join(APP_DIR))
        .ok_or_else(|| {
            DomainError::Config("Could not find application data directory".to_string())
        })?;

        Self::with_data_dir(data_dir)
    }

    /// Create a store rooted at an explicit directory.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;

        info!(data_dir = ?data_dir, "ConfigStore initialized");

        Ok(Self { data_dir })
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Result<AppConfig, DomainError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            info!(path = ?config_path, "Configuration file not found, creating default");
            let config = AppConfig::new();
            self.save(&config)?;
            return Ok(config);
        }

        debug!(path = ?config_path, "Loading configuration");
        let content = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;

        info!(path = ?config_path, "Configuration loaded");
        Ok(config)
    }

    fn save(&self, config: &AppConfig) -> Result<(), DomainError> {
        config.validate()?;

        let config_path = self.config_path();
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&config_path, toml::to_string_pretty(config)?)?;

        info!(path = ?config_path, "Configuration saved");
        Ok(())
    }

    /// Logs live next to the config on macOS and under the local data dir elsewhere.
    fn logs_dir(&self) -> PathBuf {
        if cfg!(target_os = "macos") {
            return self.data_dir.join("logs");
        }
        dirs::data_local_dir()
            .map(|p| p.join(APP_DIR).join("logs"))
            .unwrap_or_else(|| self.data_dir.join("logs"))
    }
}
