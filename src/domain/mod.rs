//! Domain Layer - Registry vocabulary with zero I/O
//!
//! This layer contains:
//! - **Value Objects**: hives, architecture views, value types and data
//! - **Locations**: the table of well-known registry paths
//! - **Domain Errors**: the crate error type

pub mod errors;
pub mod locations;
pub mod value_objects;

pub use errors::{Error, Result};
pub use locations::{LocationKind, Scope};
pub use value_objects::*;
