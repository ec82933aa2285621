//! Environment variables stored in the registry

pub mod mapping;
pub mod normalize;

pub use mapping::{EnvVarMapping, EnvironmentStore};
pub use normalize::{expand_vars, expand_vars_with, normalize_path, normalize_separators, NormalizeOptions};
