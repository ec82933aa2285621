//! Win32 platform implementation

pub mod broadcast;
pub mod path;
pub mod registry;

pub use broadcast::Win32Notifier;
pub use path::Win32PathResolver;
pub use registry::Win32Registry;
