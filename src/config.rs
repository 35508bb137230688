//! Configuration management for hostctl

use crate::error::{HostctlError, HostctlResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main hostctl configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostctlConfig {
    /// Wireless defaults
    #[serde(default)]
    pub wireless: WirelessSettings,
    /// Disk usage defaults
    #[serde(default)]
    pub disk: DiskSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirelessSettings {
    /// Interface queried when none is given
    #[serde(default = "default_interface")]
    pub default_interface: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskSettings {
    /// Filesystem types excluded from disk stats
    #[serde(default = "default_exclude_fs_types")]
    pub exclude_fs_types: Vec<String>,
}

fn default_interface() -> String {
    "wlan0".to_string()
}

fn default_exclude_fs_types() -> Vec<String> {
    vec![
        "tmpfs".to_string(),
        "devtmpfs".to_string(),
        "squashfs".to_string(),
    ]
}

impl Default for WirelessSettings {
    fn default() -> Self {
        Self {
            default_interface: default_interface(),
        }
    }
}

impl Default for DiskSettings {
    fn default() -> Self {
        Self {
            exclude_fs_types: default_exclude_fs_types(),
        }
    }
}

impl Default for HostctlConfig {
    fn default() -> Self {
        Self {
            wireless: WirelessSettings::default(),
            disk: DiskSettings::default(),
        }
    }
}

impl HostctlConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> HostctlResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| HostctlError::ConfigError(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| HostctlError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> HostctlResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HostctlError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| HostctlError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }
}
