//! RegKey - one addressable registry path

use std::fmt;

use crate::application::ports::{Access, KeyHandle, KeyTarget};
use crate::domain::errors::{Error, Result};
use crate::domain::value_objects::{ArchitectureView, Hive, RegistryLocation};
use crate::registry::{RegEntry, Registry};

const TARGET: &str = "casement::registry";

/// A registry key descriptor: hive, sub-path, optional remote computer and
/// WOW64 view. Cheap to clone; holds no open handle.
#[derive(Clone)]
pub struct RegKey {
    registry: Registry,
    hive: Hive,
    sub_path: String,
    computer: Option<String>,
    view: ArchitectureView,
}

impl RegKey {
    /// Build a key.
    ///
    /// With `sub_path` set, `location` names the hive. Without it, `location`
    /// must be a combined `HIVE\sub\path` string; the first segment is the
    /// hive and the rest is the sub-path.
    pub fn new(
        registry: Registry,
        location: impl Into<RegistryLocation>,
        sub_path: Option<&str>,
    ) -> Result<Self> {
        let location = location.into();
        let (hive, sub_path) = match sub_path {
            Some(sub_path) => (location.resolve()?, sub_path.to_string()),
            None => match &location {
                RegistryLocation::Name(combined) => {
                    let (hive, sub_path) = combined
                        .split_once('\\')
                        .ok_or_else(|| Error::MalformedPath(combined.clone()))?;
                    (Hive::from_name(hive)?, sub_path.to_string())
                }
                RegistryLocation::Hive(hive) => {
                    return Err(Error::MalformedPath(hive.name().to_string()))
                }
            },
        };

        Ok(Self::from_parts(registry, hive, &sub_path))
    }

    /// Build from an already resolved hive
    pub fn from_parts(registry: Registry, hive: Hive, sub_path: &str) -> Self {
        let view = registry.default_view();
        Self {
            registry,
            hive,
            sub_path: sub_path.to_string(),
            computer: None,
            view,
        }
    }

    /// Address the registry of a remote computer
    pub fn on_computer(mut self, computer: impl Into<String>) -> Self {
        self.computer = Some(computer.into());
        self
    }

    /// Select the WOW64 view
    pub fn with_view(mut self, view: ArchitectureView) -> Self {
        self.view = view;
        self
    }

    /// Select the WOW64 view by its numeric form (0, 32 or 64)
    pub fn with_view_bits(self, bits: u32) -> Result<Self> {
        Ok(self.with_view(ArchitectureView::from_bits(bits)?))
    }

    pub fn hive(&self) -> Hive {
        self.hive
    }

    pub fn sub_path(&self) -> &str {
        &self.sub_path
    }

    pub fn computer(&self) -> Option<&str> {
        self.computer.as_deref()
    }

    pub fn view(&self) -> ArchitectureView {
        self.view
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn target(&self) -> KeyTarget {
        KeyTarget {
            hive: self.hive,
            sub_path: self.sub_path.clone(),
            computer: self.computer.clone(),
            view: self.view,
        }
    }

    /// Full path, e.g. `HKEY_CURRENT_USER\Environment`
    pub fn path(&self) -> String {
        self.target().display_path()
    }

    /// Open a handle on the key. `Ok(None)` if the key does not exist and
    /// `create` is false. The handle closes when dropped.
    pub fn open_handle(&self, write: bool, create: bool) -> Result<Option<Box<dyn KeyHandle>>> {
        let access = if write { Access::Write } else { Access::Read };
        self.registry
            .backend()
            .open(&self.target(), access, create)
    }

    /// True if the key exists
    pub fn exists(&self) -> Result<bool> {
        Ok(self.open_handle(false, false)?.is_some())
    }

    /// Create the key (and missing parents). No-op if it already exists.
    pub fn create(&self) -> Result<()> {
        log::trace!(target: TARGET, "Creating key {}", self.path());
        match self.open_handle(true, true)? {
            Some(_) => Ok(()),
            None => Err(Error::access("create", self.path(), 0)),
        }
    }

    /// Delete the key. Returns false if it did not exist.
    ///
    /// Deletion is not recursive: a key with sub-keys is refused with
    /// [`Error::HasChildren`] and left untouched.
    pub fn delete(&self) -> Result<bool> {
        if !self.exists()? {
            return Ok(false);
        }

        let has_children = {
            let mut names = self.child_names()?;
            names.next().is_some()
        };
        if has_children {
            return Err(Error::HasChildren(self.to_string()));
        }

        log::debug!(target: TARGET, "Deleting key {}", self.path());
        self.registry.backend().delete_key(&self.target())
    }

    /// Key for the named sub-key, keeping hive, computer and view
    pub fn child(&self, name: &str) -> RegKey {
        let mut child = self.clone();
        child.sub_path = if self.sub_path.is_empty() {
            name.to_string()
        } else {
            format!("{}\\{}", self.sub_path, name)
        };
        child
    }

    /// Immediate sub-key names in index order. Empty if the key is missing.
    pub fn child_names(&self) -> Result<KeyNames> {
        Ok(KeyNames::new(self.open_handle(false, false)?, NameKind::Subkeys))
    }

    /// Entry (named value) on this key. An empty name is the default value.
    pub fn entry(&self, name: &str) -> RegEntry {
        RegEntry::new(self.clone(), name)
    }

    /// The key's `(Default)` entry
    pub fn default_entry(&self) -> RegEntry {
        self.entry("")
    }

    /// Value names in index order. Empty if the key is missing.
    pub fn entry_names(&self) -> Result<KeyNames> {
        Ok(KeyNames::new(self.open_handle(false, false)?, NameKind::Values))
    }
}

impl PartialEq for RegKey {
    fn eq(&self, other: &Self) -> bool {
        self.hive == other.hive
            && self.sub_path == other.sub_path
            && self.computer == other.computer
            && self.view == other.view
    }
}

impl Eq for RegKey {}

impl fmt::Display for RegKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let computer = match &self.computer {
            Some(computer) => format!("'{}'", computer),
            None => "None".to_string(),
        };
        write!(
            f,
            "RegKey('{}', '{}', {}, {})",
            self.hive.name(),
            self.sub_path,
            computer,
            self.view
        )
    }
}

impl fmt::Debug for RegKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Clone, Copy, Debug)]
enum NameKind {
    Subkeys,
    Values,
}

/// Lazy enumeration of sub-key or value names.
///
/// Owns an open handle until exhausted or dropped. Each call to
/// `child_names`/`entry_names` re-enumerates from a fresh handle; changing
/// the key while iterating gives unspecified results.
pub struct KeyNames {
    handle: Option<Box<dyn KeyHandle>>,
    index: u32,
    kind: NameKind,
}

impl KeyNames {
    fn new(handle: Option<Box<dyn KeyHandle>>, kind: NameKind) -> Self {
        Self {
            handle,
            index: 0,
            kind,
        }
    }
}

impl Iterator for KeyNames {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let handle = self.handle.as_ref()?;
        let result = match self.kind {
            NameKind::Subkeys => handle.subkey_name(self.index),
            NameKind::Values => handle.value_name(self.index),
        };

        match result {
            Ok(Some(name)) => {
                self.index += 1;
                Some(name)
            }
            Ok(None) => {
                self.handle = None;
                None
            }
            Err(err) => {
                log::debug!(target: TARGET, "Enumeration stopped at {}: {}", self.index, err);
                self.handle = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ValueType;

    fn registry() -> Registry {
        Registry::in_memory()
    }

    #[test]
    fn test_constructor_equivalence() {
        let registry = registry();
        for (hive, sub_path, expected) in [
            ("HKEY_LOCAL_MACHINE", "SOFTWARE\\Microsoft", Hive::LocalMachine),
            ("HKLM", "SOFTWARE\\Microsoft", Hive::LocalMachine),
            ("HKEY_CURRENT_USER", "SOFTWARE\\Microsoft", Hive::CurrentUser),
            ("HKCU", "SOFTWARE\\Microsoft", Hive::CurrentUser),
            ("HKEY_CLASSES_ROOT", "*", Hive::ClassesRoot),
            ("HKCR", "Directory", Hive::ClassesRoot),
            ("HKEY_USERS", ".DEFAULT\\Software\\Microsoft", Hive::Users),
            ("HKU", ".DEFAULT\\Software\\Microsoft", Hive::Users),
        ] {
            let split = registry.key(hive, sub_path).unwrap();
            assert_eq!(split.hive(), expected);
            assert_eq!(split.sub_path(), sub_path);

            let lower = registry.key(hive.to_lowercase().as_str(), sub_path).unwrap();
            assert_eq!(lower, split);

            let combined = registry.parse(&format!("{}\\{}", hive, sub_path)).unwrap();
            assert_eq!(combined, split);
        }
    }

    #[test]
    fn test_constructor_errors() {
        let registry = registry();
        assert!(matches!(
            registry.parse("HKLM"),
            Err(Error::MalformedPath(path)) if path == "HKLM"
        ));
        assert!(matches!(
            RegKey::new(registry.clone(), Hive::Users, None),
            Err(Error::MalformedPath(_))
        ));
        assert!(matches!(
            registry.parse("HKXX\\Software"),
            Err(Error::InvalidLocation(name)) if name == "HKXX"
        ));
        assert!(matches!(
            registry.parse("HKLM\\Software").unwrap().with_view_bits(16),
            Err(Error::InvalidView(16))
        ));
    }

    #[test]
    fn test_display() {
        let key = registry().parse("HKCU\\Environment").unwrap();
        assert_eq!(
            key.to_string(),
            "RegKey('HKEY_CURRENT_USER', 'Environment', None, 64)"
        );
        let remote = key.on_computer("build01").with_view(ArchitectureView::Wow32);
        assert_eq!(
            remote.to_string(),
            "RegKey('HKEY_CURRENT_USER', 'Environment', 'build01', 32)"
        );
    }

    #[test]
    fn test_child_preserves_settings() {
        let key = registry()
            .key("HKLM", "SOFTWARE\\Microsoft\\Windows")
            .unwrap()
            .on_computer("build01")
            .with_view(ArchitectureView::Wow32);
        let child = key.child("Notepad");
        assert_eq!(child.sub_path(), "SOFTWARE\\Microsoft\\Windows\\Notepad");
        assert_eq!(child.hive(), Hive::LocalMachine);
        assert_eq!(child.computer(), Some("build01"));
        assert_eq!(child.view(), ArchitectureView::Wow32);
    }

    #[test]
    fn test_missing_key_soft_fails() {
        let key = registry().parse("HKLM\\SOFTWARE\\InvalidName").unwrap();
        assert!(!key.exists().unwrap());
        assert!(key.open_handle(false, false).unwrap().is_none());
        assert_eq!(key.child_names().unwrap().count(), 0);
        assert_eq!(key.entry_names().unwrap().count(), 0);
    }

    #[test]
    fn test_create_is_idempotent() {
        let key = registry().parse("HKCU\\Software\\Classes\\CASEMENT_DELETE_ME").unwrap();
        key.create().unwrap();
        key.create().unwrap();
        assert!(key.exists().unwrap());
    }

    #[test]
    fn test_delete_lifecycle() {
        let registry = registry();
        let root = registry
            .key("HKCU", "Software\\Classes\\CASEMENT_DELETE_ME")
            .unwrap();
        assert!(!root.exists().unwrap());
        assert!(!root.delete().unwrap());

        root.create().unwrap();
        assert!(root.exists().unwrap());

        let child1 = root.child("CASEMENT_DELETE_ME_CHILD1");
        let child2 = root.child("CASEMENT_DELETE_ME_CHILD2");
        child1.create().unwrap();

        let err = root.delete().unwrap_err();
        assert!(err.to_string().starts_with("Unable to delete key"));
        assert!(err.to_string().contains("CASEMENT_DELETE_ME"));
        assert!(root.exists().unwrap());
        assert!(child1.exists().unwrap());

        child2.create().unwrap();
        let mut names: Vec<String> = root.child_names().unwrap().collect();
        names.sort();
        assert_eq!(
            names,
            vec!["CASEMENT_DELETE_ME_CHILD1", "CASEMENT_DELETE_ME_CHILD2"]
        );

        assert!(child1.delete().unwrap());
        assert!(!child1.exists().unwrap());
        assert!(child2.delete().unwrap());

        assert!(root.delete().unwrap());
        assert!(!root.exists().unwrap());
        assert_eq!(root.child_names().unwrap().count(), 0);
    }

    #[test]
    fn test_names_are_restartable() {
        let key = registry().parse("HKCR\\Directory").unwrap();
        key.entry("AlwaysShowExt").set("", None).unwrap();
        key.entry("PreviewTitle").set("prop:System.ItemNameDisplay", None).unwrap();
        key.child("Shell").create().unwrap();

        let first: Vec<String> = key.entry_names().unwrap().collect();
        let second: Vec<String> = key.entry_names().unwrap().collect();
        assert_eq!(first, vec!["AlwaysShowExt", "PreviewTitle"]);
        assert_eq!(first, second);
        assert_eq!(key.child_names().unwrap().collect::<Vec<_>>(), vec!["Shell"]);
        assert_eq!(
            key.entry("PreviewTitle").value_type().unwrap(),
            ValueType::SZ
        );
    }

    #[test]
    fn test_views_are_carried_to_backend() {
        let key = registry()
            .parse("HKLM\\Software\\Casement")
            .unwrap()
            .with_view(ArchitectureView::Native);
        assert_eq!(key.target().view, ArchitectureView::Native);
    }
}
