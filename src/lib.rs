//! Casement - Windows registry keys, registry-backed environment variables
//! and the "environment changed" broadcast
//!
//! Layers follow the usual inward dependency rule: `domain` has no I/O,
//! `application` defines ports and the broadcast coordinator, `registry` and
//! `env_var` build the public API on the ports, and `platform` supplies the
//! Win32 implementations (or portable stand-ins on other hosts).
//!
//! ```ignore
//! let casement = casement::Casement::new()?;
//! let user_env = casement.env(false);
//! {
//!     let _scope = user_env.delayed_broadcast();
//!     user_env.set("TOOLS_HOME", "%USERPROFILE%\\tools")?;
//!     user_env.remove("OLD_TOOLS")?;
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod env_var;
pub mod infrastructure;
pub mod platform;
pub mod registry;
pub mod shared;

pub use application::services::{Broadcaster, DelayGuard};
pub use domain::{
    ArchitectureView, Error, Hive, LocationKind, RegData, RegistryLocation, Result, Scope,
    ValueType,
};
pub use env_var::{normalize_path, EnvVarMapping, EnvironmentStore, NormalizeOptions};
pub use infrastructure::Casement;
pub use registry::{RegEntry, RegKey, Registry};
pub use shared::CasementConfig;
