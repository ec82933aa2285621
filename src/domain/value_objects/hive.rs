//! Predefined registry roots and their name/alias table

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::domain::errors::{Error, Result};

/// One of the predefined top-level registry roots
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hive {
    ClassesRoot,
    CurrentConfig,
    CurrentUser,
    DynData,
    LocalMachine,
    PerformanceData,
    Users,
}

impl Hive {
    /// Registration order of the hive table. Aliases are generated in this
    /// order and the first hive to claim an alias keeps it.
    pub const ALL: [Hive; 7] = [
        Hive::ClassesRoot,
        Hive::CurrentConfig,
        Hive::CurrentUser,
        Hive::DynData,
        Hive::LocalMachine,
        Hive::PerformanceData,
        Hive::Users,
    ];

    /// Canonical `HKEY_*` name
    pub const fn name(self) -> &'static str {
        match self {
            Hive::ClassesRoot => "HKEY_CLASSES_ROOT",
            Hive::CurrentConfig => "HKEY_CURRENT_CONFIG",
            Hive::CurrentUser => "HKEY_CURRENT_USER",
            Hive::DynData => "HKEY_DYN_DATA",
            Hive::LocalMachine => "HKEY_LOCAL_MACHINE",
            Hive::PerformanceData => "HKEY_PERFORMANCE_DATA",
            Hive::Users => "HKEY_USERS",
        }
    }

    /// Native predefined handle value
    pub const fn raw(self) -> u32 {
        match self {
            Hive::ClassesRoot => 0x8000_0000,
            Hive::CurrentUser => 0x8000_0001,
            Hive::LocalMachine => 0x8000_0002,
            Hive::Users => 0x8000_0003,
            Hive::PerformanceData => 0x8000_0004,
            Hive::CurrentConfig => 0x8000_0005,
            Hive::DynData => 0x8000_0006,
        }
    }

    /// Look up a hive by its native handle value
    pub fn from_raw(raw: u32) -> Option<Hive> {
        Hive::ALL.into_iter().find(|hive| hive.raw() == raw)
    }

    /// Resolve a canonical name or short alias, case-insensitively
    pub fn from_name(name: &str) -> Result<Hive> {
        let upper = name.to_ascii_uppercase();
        alias_table()
            .get(upper.as_str())
            .copied()
            .ok_or_else(|| Error::InvalidLocation(name.to_string()))
    }

    /// Short alias owned by this hive, if it won its alias
    pub fn alias(self) -> Option<&'static str> {
        let alias = short_alias(self.name());
        alias_table()
            .get_key_value(alias.as_str())
            .filter(|(_, hive)| **hive == self)
            .map(|(key, _)| key.as_str())
    }
}

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Hive {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Hive::from_name(s)
    }
}

/// `HKEY_LOCAL_MACHINE` -> `HKLM`: "HK" followed by the first letter of each
/// underscore-separated segment after the first.
fn short_alias(name: &str) -> String {
    let initials: String = name
        .split('_')
        .skip(1)
        .filter_map(|segment| segment.chars().next())
        .collect();
    format!("HK{}", initials)
}

static ALIASES: OnceLock<HashMap<String, Hive>> = OnceLock::new();

fn alias_table() -> &'static HashMap<String, Hive> {
    ALIASES.get_or_init(|| {
        let mut table = HashMap::new();
        for hive in Hive::ALL {
            table.insert(hive.name().to_string(), hive);
        }
        for hive in Hive::ALL {
            table.entry(short_alias(hive.name())).or_insert(hive);
        }
        table
    })
}

/// A registry root given either by name/alias or by resolved hive
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryLocation {
    Name(String),
    Hive(Hive),
}

impl RegistryLocation {
    /// Resolve to a hive
    pub fn resolve(&self) -> Result<Hive> {
        match self {
            RegistryLocation::Name(name) => Hive::from_name(name),
            RegistryLocation::Hive(hive) => Ok(*hive),
        }
    }
}

impl From<Hive> for RegistryLocation {
    fn from(hive: Hive) -> Self {
        RegistryLocation::Hive(hive)
    }
}

impl From<&str> for RegistryLocation {
    fn from(name: &str) -> Self {
        RegistryLocation::Name(name.to_string())
    }
}

impl From<String> for RegistryLocation {
    fn from(name: String) -> Self {
        RegistryLocation::Name(name)
    }
}
