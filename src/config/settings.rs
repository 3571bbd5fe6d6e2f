//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and data, and the settings
//! that shape a sweep.

use crate::error::{ConfigError, ConfigResult};
use crate::output::OutputFormat;
use crate::reconcile::FailurePolicy;
use crate::scanner::SweepConfig;
use crate::types::PortSet;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/netsweep)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/netsweep)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Locate the XDG directories. Nothing is created on disk.
    pub fn discover() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "netsweep", "netsweep")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the path to the host store.
    pub fn hosts_file(&self) -> PathBuf {
        self.data_dir.join("hosts.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Ports probed on every address, in order.
    pub ports: PortSet,
    /// Connect timeout per probe, in milliseconds.
    pub probe_timeout_ms: u64,
    /// Maximum address tasks in flight at once.
    pub max_in_flight: usize,
    /// Result channel buffer size.
    pub channel_capacity: usize,
    /// Largest range a sweep may cover.
    pub max_hosts: u64,
    /// Stop reconciling at the first unexpected storage error.
    pub fail_fast: bool,
    /// Default output format.
    pub default_output_format: OutputFormat,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            ports: PortSet::default(),
            probe_timeout_ms: 4000,
            max_in_flight: SweepConfig::DEFAULT_MAX_IN_FLIGHT,
            channel_capacity: SweepConfig::DEFAULT_CHANNEL_CAPACITY,
            max_hosts: 65536,
            fail_fast: false,
            default_output_format: OutputFormat::Plain,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if there is no
    /// settings file.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::discover()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        settings.validate()?;

        Ok(settings)
    }

    /// Save settings to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        let paths = Paths::discover()?;
        fs::create_dir_all(&paths.config_dir)?;
        self.save_to(&paths.settings_file())
    }

    /// Save settings to a specific file.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Reject values a sweep cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.probe_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "probe_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.max_in_flight == 0 {
            return Err(ConfigError::InvalidValue(
                "max_in_flight must be greater than 0".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "channel_capacity must be greater than 0".to_string(),
            ));
        }
        if self.max_hosts == 0 {
            return Err(ConfigError::InvalidValue(
                "max_hosts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig::new(self.max_in_flight, self.channel_capacity)
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        if self.fail_fast {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.probe_timeout(), Duration::from_secs(4));
        assert_eq!(settings.ports, PortSet::default());
        assert_eq!(settings.failure_policy(), FailurePolicy::Continue);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "ports": [8080, 22], "fail_fast": true }"#).unwrap();

        let settings = AppSettings::load_from(&path).unwrap();
        assert_eq!(settings.ports.to_string(), "8080,22");
        assert_eq!(settings.failure_policy(), FailurePolicy::Abort);
        assert_eq!(settings.max_in_flight, SweepConfig::DEFAULT_MAX_IN_FLIGHT);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let settings = AppSettings {
            max_in_flight: 32,
            default_output_format: OutputFormat::Json,
            ..AppSettings::default()
        };

        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        fs::write(&path, r#"{ "max_in_flight": 0 }"#).unwrap();
        assert!(matches!(AppSettings::load_from(&path), Err(ConfigError::InvalidValue(_))));

        fs::write(&path, r#"{ "ports": [] }"#).unwrap();
        assert!(matches!(AppSettings::load_from(&path), Err(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_sweep_config() {
        let settings = AppSettings {
            max_in_flight: 8,
            channel_capacity: 2,
            ..AppSettings::default()
        };
        assert_eq!(settings.sweep_config(), SweepConfig::new(8, 2));
    }
}
