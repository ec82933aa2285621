//! Commonly looked up registry locations

use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{Error, Result};
use crate::domain::value_objects::Hive;

/// Whose settings a location belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    System,
    User,
}

impl Scope {
    pub fn from_system(system: bool) -> Self {
        if system {
            Scope::System
        } else {
            Scope::User
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Scope::System => "system",
            Scope::User => "user",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Well-known location kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocationKind {
    Classes,
    EnvVar,
    Uninstall,
}

impl LocationKind {
    pub const fn name(self) -> &'static str {
        match self {
            LocationKind::Classes => "classes",
            LocationKind::EnvVar => "env_var",
            LocationKind::Uninstall => "uninstall",
        }
    }
}

impl FromStr for LocationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "classes" => Ok(LocationKind::Classes),
            "env_var" => Ok(LocationKind::EnvVar),
            "uninstall" => Ok(LocationKind::Uninstall),
            other => Err(Error::InvalidLocation(other.to_string())),
        }
    }
}

pub const SYSTEM_ENVIRONMENT: &str =
    "SYSTEM\\CurrentControlSet\\Control\\Session Manager\\Environment";
pub const USER_ENVIRONMENT: &str = "Environment";
pub const CLASSES: &str = "Software\\Classes";
pub const UNINSTALL: &str = "Software\\Microsoft\\Windows\\CurrentVersion\\Uninstall";

/// Hive and sub-path of the environment key of a scope
pub fn environment(scope: Scope) -> (Hive, &'static str) {
    match scope {
        Scope::System => (Hive::LocalMachine, SYSTEM_ENVIRONMENT),
        Scope::User => (Hive::CurrentUser, USER_ENVIRONMENT),
    }
}

/// Hive and sub-path of a well-known location. The user scope has no
/// uninstall location.
pub fn well_known(scope: Scope, kind: LocationKind) -> Option<(Hive, &'static str)> {
    match (scope, kind) {
        (Scope::System, LocationKind::Classes) => Some((Hive::LocalMachine, CLASSES)),
        (scope, LocationKind::EnvVar) => Some(environment(scope)),
        (Scope::System, LocationKind::Uninstall) => Some((Hive::LocalMachine, UNINSTALL)),
        (Scope::User, LocationKind::Classes) => Some((Hive::CurrentUser, CLASSES)),
        (Scope::User, LocationKind::Uninstall) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_locations() {
        assert_eq!(
            well_known(Scope::User, LocationKind::EnvVar),
            Some((Hive::CurrentUser, "Environment"))
        );
        let (hive, path) = well_known(Scope::System, LocationKind::EnvVar).unwrap();
        assert_eq!(hive, Hive::LocalMachine);
        assert!(path.ends_with("Session Manager\\Environment"));
    }

    #[test]
    fn test_environment_matches_table() {
        for scope in [Scope::System, Scope::User] {
            assert_eq!(
                Some(environment(scope)),
                well_known(scope, LocationKind::EnvVar)
            );
        }
    }

    #[test]
    fn test_user_has_no_uninstall() {
        assert_eq!(well_known(Scope::User, LocationKind::Uninstall), None);
        assert!(well_known(Scope::System, LocationKind::Uninstall).is_some());
    }

    #[test]
    fn test_kind_names() {
        for kind in [LocationKind::Classes, LocationKind::EnvVar, LocationKind::Uninstall] {
            assert_eq!(kind.name().parse::<LocationKind>().unwrap(), kind);
        }
        assert!("startup".parse::<LocationKind>().is_err());
        assert_eq!(Scope::from_system(true), Scope::System);
    }
}
