//! RegEntry - a named value under a key

use std::fmt;

use crate::domain::errors::{Error, Result};
use crate::domain::value_objects::{RegData, ValueType};
use crate::registry::RegKey;

/// Addressing pair of a key and a value name. An empty name is the key's
/// `(Default)` value.
#[derive(Clone, PartialEq, Eq)]
pub struct RegEntry {
    key: RegKey,
    name: String,
}

impl RegEntry {
    pub fn new(key: RegKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
        }
    }

    pub fn key(&self) -> &RegKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn not_found(&self) -> Error {
        Error::EntryNotFound {
            key: self.key.path(),
            name: self.name.clone(),
        }
    }

    /// Data and type tag. Fails with `EntryNotFound` if the value or its
    /// key does not exist.
    pub fn value_info(&self) -> Result<(RegData, ValueType)> {
        let handle = self
            .key
            .open_handle(false, false)?
            .ok_or_else(|| self.not_found())?;
        let (bytes, value_type) = handle
            .query_value(&self.name)?
            .ok_or_else(|| self.not_found())?;
        Ok((RegData::from_bytes(value_type, &bytes), value_type))
    }

    /// Data only
    pub fn value(&self) -> Result<RegData> {
        Ok(self.value_info()?.0)
    }

    /// Type tag only
    pub fn value_type(&self) -> Result<ValueType> {
        Ok(self.value_info()?.1)
    }

    /// Write the value, creating the owning key if needed. Without an
    /// explicit type the data's natural type is used.
    pub fn set(&self, data: impl Into<RegData>, value_type: Option<ValueType>) -> Result<()> {
        let data = data.into();
        let value_type = value_type.unwrap_or_else(|| data.natural_type());
        let handle = self
            .key
            .open_handle(true, true)?
            .ok_or_else(|| Error::access("create", self.key.path(), 0))?;
        handle.set_value(&self.name, value_type, &data.to_bytes())
    }

    /// Write the value with a `REG_*` type given by name
    pub fn set_with_type_name(&self, data: impl Into<RegData>, type_name: &str) -> Result<()> {
        let value_type = ValueType::from_name(type_name)?;
        self.set(data, Some(value_type))
    }

    /// Remove the value. Fails with `EntryNotFound` if it does not exist.
    pub fn delete(&self) -> Result<()> {
        let handle = self
            .key
            .open_handle(true, false)?
            .ok_or_else(|| self.not_found())?;
        if handle.delete_value(&self.name)? {
            Ok(())
        } else {
            Err(self.not_found())
        }
    }
}

impl fmt::Debug for RegEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegEntry({}, {:?})", self.key, self.name)
    }
}
