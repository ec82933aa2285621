//! Error types for registry and environment operations

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::value_objects::ValueType;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    /// Hive name or alias that does not resolve to a predefined root
    #[error("Invalid registry location: {0}")]
    InvalidLocation(String),

    /// Combined `HIVE\sub\path` string without a separator
    #[error("Malformed registry path (expected HIVE\\sub\\path): {0}")]
    MalformedPath(String),

    /// Architecture view other than 0, 32 or 64
    #[error("Invalid architecture view: {0} (expected 0, 32 or 64)")]
    InvalidView(u32),

    /// Value type name missing from the REG_* table
    #[error("Unknown registry value type: {0}")]
    UnknownValueType(String),

    /// Any OS-level failure while opening, reading or writing a key
    #[error("Registry {operation} failed for {path} (code {code})")]
    RegistryAccess {
        operation: &'static str,
        path: String,
        code: u32,
    },

    /// Value (or its key) absent where it was required to exist
    #[error("Entry not found: {name:?} under {key}")]
    EntryNotFound { key: String, name: String },

    /// Value whose type has no text form
    #[error("Value {name:?} holds {value_type} data, not text")]
    NotText { name: String, value_type: ValueType },

    /// Non-recursive delete refused
    #[error("Unable to delete key, it has sub-keys. {0}")]
    HasChildren(String),

    /// Short/long path resolution on a path missing from disk
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// IO error (wrapped)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a `RegistryAccess` error
    pub fn access(operation: &'static str, path: impl Into<String>, code: u32) -> Self {
        Error::RegistryAccess {
            operation,
            path: path.into(),
            code,
        }
    }

    /// True for `EntryNotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::EntryNotFound { .. })
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
