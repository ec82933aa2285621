//! Platform abstraction layer
//!
//! Windows gets the native registry, broadcast and path APIs. Other hosts get
//! an in-process registry, a silent notifier and an existence-only path
//! resolver, which keeps the crate usable (and testable) everywhere.

pub mod portable;
#[cfg(target_os = "windows")]
pub mod win32;

use crate::application::ports::{PathResolver, SettingsNotifier};
use crate::registry::Registry;

/// The host's registry
pub fn default_registry() -> Registry {
    #[cfg(target_os = "windows")]
    {
        Registry::native()
    }
    #[cfg(not(target_os = "windows"))]
    {
        log::warn!(target: "casement::registry", "No native registry, using an in-memory one");
        Registry::in_memory()
    }
}

/// The host's settings-changed notifier
pub fn default_notifier() -> Box<dyn SettingsNotifier> {
    #[cfg(target_os = "windows")]
    {
        Box::new(win32::Win32Notifier)
    }
    #[cfg(not(target_os = "windows"))]
    {
        Box::new(crate::application::ports::NullNotifier)
    }
}

/// The host's short/long path resolver
pub fn default_path_resolver() -> Box<dyn PathResolver> {
    #[cfg(target_os = "windows")]
    {
        Box::new(win32::Win32PathResolver)
    }
    #[cfg(not(target_os = "windows"))]
    {
        Box::new(portable::ExistingPathResolver)
    }
}
