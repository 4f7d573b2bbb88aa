use std::path::PathBuf;

use crate::domain::{AppConfig, DomainError};

/// Where the intake pipeline's settings live between runs.
pub trait ConfigStore: Send + Sync {
    /// Load and validate the configuration, writing defaults on first run.
    fn load(&self) -> Result<AppConfig, DomainError>;

    /// Validate and persist the configuration.
    fn save(&self, config: &AppConfig) -> Result<(), DomainError>;

    /// Directory the rolling log files are written to.
    fn logs_dir(&self) -> PathBuf;
}
