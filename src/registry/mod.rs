//! Registry keys and entries
//!
//! [`RegKey`] and [`RegEntry`] are addressing descriptors. They hold no open
//! handle: each operation opens one through the [`Registry`] backend, uses it
//! and drops it before returning.

pub mod entry;
pub mod key;

use std::fmt;
use std::sync::Arc;

pub use entry::RegEntry;
pub use key::{KeyNames, RegKey};

use crate::adapters::gateways::MemoryRegistry;
use crate::application::ports::RegistryBackend;
use crate::domain::errors::Result;
use crate::domain::locations::{self, LocationKind, Scope};
use crate::domain::value_objects::{ArchitectureView, RegistryLocation};

/// Shared handle to a registry backend plus key defaults
#[derive(Clone)]
pub struct Registry {
    backend: Arc<dyn RegistryBackend>,
    default_view: ArchitectureView,
}

impl Registry {
    /// Wrap a backend
    pub fn new(backend: impl RegistryBackend + 'static) -> Self {
        Self::from_backend(Arc::new(backend))
    }

    /// Wrap an already shared backend
    pub fn from_backend(backend: Arc<dyn RegistryBackend>) -> Self {
        Self {
            backend,
            default_view: ArchitectureView::default(),
        }
    }

    /// Empty in-process registry
    pub fn in_memory() -> Self {
        Self::new(MemoryRegistry::new())
    }

    /// The host's registry
    #[cfg(target_os = "windows")]
    pub fn native() -> Self {
        Self::new(crate::platform::win32::Win32Registry)
    }

    /// View given to keys created through this registry
    pub fn with_default_view(mut self, view: ArchitectureView) -> Self {
        self.default_view = view;
        self
    }

    pub fn default_view(&self) -> ArchitectureView {
        self.default_view
    }

    /// Key from a hive (name, alias or resolved) and a sub-path
    pub fn key(&self, location: impl Into<RegistryLocation>, sub_path: &str) -> Result<RegKey> {
        RegKey::new(self.clone(), location, Some(sub_path))
    }

    /// Key from a combined `HIVE\sub\path` string
    pub fn parse(&self, combined: &str) -> Result<RegKey> {
        RegKey::new(self.clone(), combined, None)
    }

    /// One of the well-known locations
    pub fn location(&self, scope: Scope, kind: LocationKind) -> Option<RegKey> {
        locations::well_known(scope, kind)
            .map(|(hive, sub_path)| RegKey::from_parts(self.clone(), hive, sub_path))
    }

    pub(crate) fn backend(&self) -> &dyn RegistryBackend {
        self.backend.as_ref()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("default_view", &self.default_view)
            .finish_non_exhaustive()
    }
}
