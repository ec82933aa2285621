//! Casement configuration (casement.toml)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::errors::{Error, Result};
use crate::domain::locations::Scope;
use crate::domain::value_objects::ArchitectureView;

const CONFIG_FILE: &str = "casement.toml";
const LOG_FILE: &str = "casement.log";

/// Configuration loaded from casement.toml
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CasementConfig {
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Extra named locations per scope, as `HIVE\sub\path` strings
    #[serde(default)]
    pub locations: LocationsConfig,
}

/// Environment-change broadcast settings
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BroadcastConfig {
    /// Initial state of new broadcasters
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Per-window timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl BroadcastConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RegistryConfig {
    /// Default architecture view in bits: 0, 32 or 64
    #[serde(default = "default_view")]
    pub view: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            view: default_view(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,

    /// One of off, error, warn, info, debug, trace
    #[serde(default = "default_level")]
    pub level: String,

    /// Log file, resolved against the working directory when relative.
    /// Defaults to casement.log next to the executable.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LoggingConfig {
    /// Configured log file, or casement.log next to the executable
    pub fn log_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|dir| dir.join(LOG_FILE)))
                .unwrap_or_else(|| PathBuf::from(LOG_FILE)),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: default_level(),
            path: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LocationsConfig {
    #[serde(default)]
    pub user: BTreeMap<String, String>,

    #[serde(default)]
    pub system: BTreeMap<String, String>,
}

impl LocationsConfig {
    /// Configured location for a scope, matched case-insensitively by name
    pub fn get(&self, scope: Scope, name: &str) -> Option<&str> {
        let table = match scope {
            Scope::User => &self.user,
            Scope::System => &self.system,
        };
        table
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, path)| path.as_str())
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_view() -> u32 {
    64
}

fn default_level() -> String {
    "info".to_string()
}

impl CasementConfig {
    /// Find casement.toml in standard locations
    pub fn find_config_path() -> Option<PathBuf> {
        // Check in order: config dir, exe dir, cwd
        let candidates = [
            dirs::config_dir().map(|p| p.join("casement").join(CONFIG_FILE)),
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join(CONFIG_FILE))),
            Some(PathBuf::from(CONFIG_FILE)),
        ];

        candidates.into_iter().flatten().find(|candidate| candidate.exists())
    }

    /// Load configuration, returning defaults if no file is found
    pub fn load() -> Result<Self> {
        match Self::find_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::debug!(target: "casement::config", "Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CasementConfig = toml::from_str(content)?;
        config.view()?;
        config.level_filter()?;
        Ok(config)
    }

    /// Default architecture view
    pub fn view(&self) -> Result<ArchitectureView> {
        ArchitectureView::from_bits(self.registry.view)
    }

    /// Log level; `off` when logging is disabled
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        let level = log::LevelFilter::from_str(&self.logging.level)
            .map_err(|_| Error::Config(format!("unknown log level: {}", self.logging.level)))?;
        Ok(if self.logging.enabled {
            level
        } else {
            log::LevelFilter::Off
        })
    }
}
