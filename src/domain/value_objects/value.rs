//! Registry value type tags and the data codec
//!
//! Type tags are passed through untouched: a value written with a tag is
//! read back with the same tag. Data is encoded from its variant and decoded
//! according to the stored tag.

use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{Error, Result};

/// Native registry value type tag (`REG_*`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ValueType(pub u32);

impl ValueType {
    pub const NONE: ValueType = ValueType(0);
    pub const SZ: ValueType = ValueType(1);
    pub const EXPAND_SZ: ValueType = ValueType(2);
    pub const BINARY: ValueType = ValueType(3);
    pub const DWORD: ValueType = ValueType(4);
    pub const DWORD_BIG_ENDIAN: ValueType = ValueType(5);
    pub const LINK: ValueType = ValueType(6);
    pub const MULTI_SZ: ValueType = ValueType(7);
    pub const RESOURCE_LIST: ValueType = ValueType(8);
    pub const FULL_RESOURCE_DESCRIPTOR: ValueType = ValueType(9);
    pub const RESOURCE_REQUIREMENTS_LIST: ValueType = ValueType(10);
    pub const QWORD: ValueType = ValueType(11);

    /// Resolve a `REG_*` name (case-insensitive) to its tag
    pub fn from_name(name: &str) -> Result<Self> {
        let upper = name.trim().to_ascii_uppercase();
        NAMES
            .iter()
            .find(|(candidate, _)| *candidate == upper)
            .map(|(_, tag)| *tag)
            .ok_or_else(|| Error::UnknownValueType(name.to_string()))
    }

    /// Canonical `REG_*` name, if the tag is a known one
    pub fn name(self) -> Option<&'static str> {
        NAMES
            .iter()
            .find(|(_, tag)| *tag == self)
            .map(|(name, _)| *name)
    }

    /// True for the two string tags
    pub fn is_string(self) -> bool {
        self == ValueType::SZ || self == ValueType::EXPAND_SZ
    }
}

/// Name table. Aliases follow their canonical entry so `name()` returns the
/// canonical spelling.
const NAMES: &[(&str, ValueType)] = &[
    ("REG_NONE", ValueType::NONE),
    ("REG_SZ", ValueType::SZ),
    ("REG_EXPAND_SZ", ValueType::EXPAND_SZ),
    ("REG_BINARY", ValueType::BINARY),
    ("REG_DWORD", ValueType::DWORD),
    ("REG_DWORD_LITTLE_ENDIAN", ValueType::DWORD),
    ("REG_DWORD_BIG_ENDIAN", ValueType::DWORD_BIG_ENDIAN),
    ("REG_LINK", ValueType::LINK),
    ("REG_MULTI_SZ", ValueType::MULTI_SZ),
    ("REG_RESOURCE_LIST", ValueType::RESOURCE_LIST),
    ("REG_FULL_RESOURCE_DESCRIPTOR", ValueType::FULL_RESOURCE_DESCRIPTOR),
    (
        "REG_RESOURCE_REQUIREMENTS_LIST",
        ValueType::RESOURCE_REQUIREMENTS_LIST,
    ),
    ("REG_QWORD", ValueType::QWORD),
    ("REG_QWORD_LITTLE_ENDIAN", ValueType::QWORD),
];

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ValueType::from_name(s)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "REG_UNKNOWN({})", self.0),
        }
    }
}

/// Decoded value data
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegData {
    String(String),
    MultiString(Vec<String>),
    Dword(u32),
    Qword(u64),
    Binary(Vec<u8>),
}

impl RegData {
    /// Tag used when `set` is called without an explicit type
    pub fn natural_type(&self) -> ValueType {
        match self {
            RegData::String(_) => ValueType::SZ,
            RegData::MultiString(_) => ValueType::MULTI_SZ,
            RegData::Dword(_) => ValueType::DWORD,
            RegData::Qword(_) => ValueType::QWORD,
            RegData::Binary(_) => ValueType::BINARY,
        }
    }

    /// Wire bytes as stored by the registry
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            RegData::String(s) => encode_wide(s),
            RegData::MultiString(items) => {
                let mut bytes = Vec::new();
                for item in items {
                    bytes.extend(encode_wide(item));
                }
                bytes.extend_from_slice(&[0, 0]);
                bytes
            }
            RegData::Dword(v) => v.to_le_bytes().to_vec(),
            RegData::Qword(v) => v.to_le_bytes().to_vec(),
            RegData::Binary(bytes) => bytes.clone(),
        }
    }

    /// Decode stored bytes according to the tag they were written with
    pub fn from_bytes(value_type: ValueType, bytes: &[u8]) -> Self {
        match value_type {
            string if string.is_string() => {
                let units = wide_units(bytes);
                let end = units.iter().position(|&c| c == 0).unwrap_or(units.len());
                RegData::String(String::from_utf16_lossy(&units[..end]))
            }
            ValueType::MULTI_SZ => {
                let units = wide_units(bytes);
                let items = units
                    .split(|&c| c == 0)
                    .take_while(|item| !item.is_empty())
                    .map(String::from_utf16_lossy)
                    .collect();
                RegData::MultiString(items)
            }
            ValueType::DWORD => {
                let mut buf = [0u8; 4];
                let n = bytes.len().min(4);
                buf[..n].copy_from_slice(&bytes[..n]);
                RegData::Dword(u32::from_le_bytes(buf))
            }
            ValueType::QWORD => {
                let mut buf = [0u8; 8];
                let n = bytes.len().min(8);
                buf[..n].copy_from_slice(&bytes[..n]);
                RegData::Qword(u64::from_le_bytes(buf))
            }
            _ => RegData::Binary(bytes.to_vec()),
        }
    }

    /// String payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RegData::String(s) => Some(s),
            _ => None,
        }
    }

}

fn encode_wide(s: &str) -> Vec<u8> {
    s.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}

fn wide_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

impl From<&str> for RegData {
    fn from(s: &str) -> Self {
        RegData::String(s.to_string())
    }
}

impl From<String> for RegData {
    fn from(s: String) -> Self {
        RegData::String(s)
    }
}

impl From<Vec<String>> for RegData {
    fn from(items: Vec<String>) -> Self {
        RegData::MultiString(items)
    }
}

impl From<u32> for RegData {
    fn from(v: u32) -> Self {
        RegData::Dword(v)
    }
}

impl From<u64> for RegData {
    fn from(v: u64) -> Self {
        RegData::Qword(v)
    }
}

impl From<Vec<u8>> for RegData {
    fn from(bytes: Vec<u8>) -> Self {
        RegData::Binary(bytes)
    }
}

impl From<&[u8]> for RegData {
    fn from(bytes: &[u8]) -> Self {
        RegData::Binary(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(ValueType::from_name("REG_EXPAND_SZ").unwrap(), ValueType(2));
        assert_eq!("reg_sz".parse::<ValueType>().unwrap(), ValueType::SZ);
        assert_eq!(
            ValueType::from_name("REG_DWORD_LITTLE_ENDIAN").unwrap(),
            ValueType::DWORD
        );
        assert_eq!(ValueType::DWORD.name(), Some("REG_DWORD"));
        assert_eq!(ValueType(99).name(), None);
        assert_eq!(ValueType(99).to_string(), "REG_UNKNOWN(99)");
    }

    #[test]
    fn test_unknown_type_name() {
        assert!(matches!(
            ValueType::from_name("REG_BOGUS"),
            Err(Error::UnknownValueType(name)) if name == "REG_BOGUS"
        ));
    }

    #[test]
    fn test_string_wire_format() {
        let bytes = RegData::from("ab").to_bytes();
        assert_eq!(bytes, vec![b'a', 0, b'b', 0, 0, 0]);
        assert_eq!(
            RegData::from_bytes(ValueType::EXPAND_SZ, &bytes),
            RegData::String("ab".into())
        );
    }

    #[test]
    fn test_multi_string_wire_format() {
        let data = RegData::from(vec!["a".to_string(), "bc".to_string()]);
        let bytes = data.to_bytes();
        assert_eq!(bytes.len(), (2 + 3 + 1) * 2);
        assert_eq!(RegData::from_bytes(ValueType::MULTI_SZ, &bytes), data);
    }

    #[test]
    fn test_numbers_and_binary() {
        assert_eq!(
            RegData::from_bytes(ValueType::DWORD, &[0xd2, 0x01, 0, 0]),
            RegData::Dword(0x1d2)
        );
        assert_eq!(
            RegData::from_bytes(ValueType::QWORD, &7u64.to_le_bytes()),
            RegData::Qword(7)
        );
        assert_eq!(
            RegData::from_bytes(ValueType::BINARY, &[0xd2, 0x01, 0, 0]),
            RegData::Binary(vec![0xd2, 0x01, 0, 0])
        );
    }

    #[test]
    fn test_string_tags() {
        assert!(ValueType::SZ.is_string());
        assert!(ValueType::EXPAND_SZ.is_string());
        assert!(!ValueType::MULTI_SZ.is_string());
        assert!(!ValueType(99).is_string());
    }

    #[test]
    fn test_natural_type() {
        assert_eq!(RegData::from("x").natural_type(), ValueType::SZ);
        assert_eq!(RegData::from(1u32).natural_type(), ValueType::DWORD);
        assert_eq!(RegData::from(vec![1u8]).natural_type(), ValueType::BINARY);
    }
}
