//! Infrastructure Layer
//!
//! Wires configuration and platform services into a ready-to-use context.

pub mod composition_root;

pub use composition_root::Casement;
