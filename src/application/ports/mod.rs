//! Application Ports - Interfaces for external dependencies
//!
//! Ports define the interfaces that platform code must implement.
//! They keep registry and environment logic testable off Windows.

pub mod notifier_port;
pub mod path_port;
pub mod registry_port;

pub use notifier_port::{NullNotifier, SettingsNotifier};
pub use path_port::PathResolver;
pub use registry_port::{Access, KeyHandle, KeyTarget, RegistryBackend};
