//! RegistryPort - interface for raw registry access
//!
//! A backend opens handles on demand. Handles are released when dropped, so
//! every operation that opens one releases it before returning, including on
//! the error path.

use crate::domain::errors::Result;
use crate::domain::value_objects::{ArchitectureView, Hive, ValueType};

/// Requested access for an open handle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Everything a backend needs to locate a key
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyTarget {
    pub hive: Hive,
    pub sub_path: String,
    pub computer: Option<String>,
    pub view: ArchitectureView,
}

impl KeyTarget {
    /// `HKEY_CURRENT_USER\Environment` style path for messages
    pub fn display_path(&self) -> String {
        let local = if self.sub_path.is_empty() {
            self.hive.name().to_string()
        } else {
            format!("{}\\{}", self.hive.name(), self.sub_path)
        };
        match &self.computer {
            Some(computer) => format!("\\\\{}\\{}", computer, local),
            None => local,
        }
    }
}

/// An open key. Dropping it closes the underlying handle.
pub trait KeyHandle {
    /// Name of the sub-key at `index`, `None` past the last one
    fn subkey_name(&self, index: u32) -> Result<Option<String>>;

    /// Name of the value at `index`, `None` past the last one
    fn value_name(&self, index: u32) -> Result<Option<String>>;

    /// Number of values stored on the key
    fn value_count(&self) -> Result<u32>;

    /// Raw data and type of a value, `None` if the value does not exist
    fn query_value(&self, name: &str) -> Result<Option<(Vec<u8>, ValueType)>>;

    /// Write a value, replacing any existing one
    fn set_value(&self, name: &str, value_type: ValueType, data: &[u8]) -> Result<()>;

    /// Remove a value. Returns false if it did not exist.
    fn delete_value(&self, name: &str) -> Result<bool>;
}

/// Port interface for registry backends
pub trait RegistryBackend: Send + Sync {
    /// Open (or create) the key at `target`.
    ///
    /// Returns `Ok(None)` when the key does not exist and `create` is false.
    /// Every other failure is an error.
    fn open(
        &self,
        target: &KeyTarget,
        access: Access,
        create: bool,
    ) -> Result<Option<Box<dyn KeyHandle>>>;

    /// Delete a key without children. Returns false if it did not exist.
    fn delete_key(&self, target: &KeyTarget) -> Result<bool>;
}
