//! Gateways - Port implementations that need no operating system support

pub mod memory_registry;
pub mod recording_notifier;

pub use memory_registry::MemoryRegistry;
pub use recording_notifier::RecordingNotifier;
