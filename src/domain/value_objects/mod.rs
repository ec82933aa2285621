//! Value Objects - Immutable descriptors with no I/O

pub mod hive;
pub mod value;
pub mod view;

pub use hive::{Hive, RegistryLocation};
pub use value::{RegData, ValueType};
pub use view::ArchitectureView;
