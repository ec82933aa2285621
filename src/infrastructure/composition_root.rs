//! CompositionRoot - Dependency Injection Container
//!
//! Builds the registry, the shared broadcaster and the path resolver from
//! configuration and hands out environment mappings and keys that share them.

use std::rc::Rc;

use crate::application::ports::{PathResolver, SettingsNotifier};
use crate::application::services::Broadcaster;
use crate::domain::errors::Result;
use crate::domain::locations::{LocationKind, Scope};
use crate::env_var::{normalize, EnvVarMapping, NormalizeOptions};
use crate::platform;
use crate::registry::{RegKey, Registry};
use crate::shared::config::CasementConfig;
use crate::shared::logging;

/// Application context - owns all dependencies
pub struct Casement {
    config: CasementConfig,
    registry: Registry,
    broadcaster: Rc<Broadcaster>,
    paths: Box<dyn PathResolver>,
}

impl Casement {
    /// Context for the host, configured from casement.toml if one is found
    pub fn new() -> Result<Self> {
        Self::with_config(CasementConfig::load()?)
    }

    /// Context for the host with an explicit configuration
    pub fn with_config(config: CasementConfig) -> Result<Self> {
        Self::with_parts(
            config,
            platform::default_registry(),
            platform::default_notifier(),
            platform::default_path_resolver(),
        )
    }

    /// Context over caller-provided services. Installs the file logger when
    /// `[logging]` is enabled and no logger is installed yet.
    pub fn with_parts(
        config: CasementConfig,
        registry: Registry,
        notifier: Box<dyn SettingsNotifier>,
        paths: Box<dyn PathResolver>,
    ) -> Result<Self> {
        if config.logging.enabled {
            let path = config.logging.log_path();
            if !logging::init(&path, config.level_filter()?)? {
                log::debug!(
                    target: "casement",
                    "Logger already installed, not logging to {}",
                    path.display()
                );
            }
        }

        let registry = registry.with_default_view(config.view()?);
        let broadcaster = Broadcaster::from_boxed(notifier)
            .with_timeout(config.broadcast.timeout())
            .with_enabled(config.broadcast.enabled);

        Ok(Self {
            config,
            registry,
            broadcaster: Rc::new(broadcaster),
            paths,
        })
    }

    pub fn config(&self) -> &CasementConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Broadcaster shared by every mapping from this context
    pub fn broadcaster(&self) -> &Rc<Broadcaster> {
        &self.broadcaster
    }

    /// User (`system == false`) or system environment
    pub fn env(&self, system: bool) -> EnvVarMapping {
        EnvVarMapping::new(&self.registry, system, Rc::clone(&self.broadcaster))
    }

    /// Key from a combined `HIVE\sub\path` string
    pub fn key(&self, combined: &str) -> Result<RegKey> {
        self.registry.parse(combined)
    }

    /// One of the built-in well-known locations
    pub fn location(&self, scope: Scope, kind: LocationKind) -> Option<RegKey> {
        self.registry.location(scope, kind)
    }

    /// Location by name: built-in kinds (`classes`, `env_var`, `uninstall`)
    /// first, then the `[locations]` tables of the configuration
    pub fn named_location(&self, scope: Scope, name: &str) -> Result<Option<RegKey>> {
        if let Ok(kind) = name.to_ascii_lowercase().parse::<LocationKind>() {
            if let Some(key) = self.location(scope, kind) {
                return Ok(Some(key));
            }
        }
        match self.config.locations.get(scope, name) {
            Some(combined) => self.key(combined).map(Some),
            None => Ok(None),
        }
    }

    /// Normalize a path with this context's path resolver
    pub fn normalize_path(&self, path: &str, options: &NormalizeOptions) -> Result<String> {
        normalize::normalize_path(path, options, self.paths.as_ref())
    }
}
