//! MemoryRegistry - In-process registry backend
//!
//! Behaves like the native registry for the operations this crate uses:
//! case-insensitive key and value names, sub-keys enumerated in name order,
//! values in insertion order, predefined hives that always exist. Each remote
//! computer name gets its own set of hives. WOW64 views are not simulated;
//! all views share one tree.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::application::ports::{Access, KeyHandle, KeyTarget, RegistryBackend};
use crate::domain::errors::{Error, Result};
use crate::domain::value_objects::{Hive, ValueType};

const ERROR_ACCESS_DENIED: u32 = 5;
const ERROR_KEY_DELETED: u32 = 1018;

type RootId = (Option<String>, Hive);

fn fold(name: &str) -> String {
    name.to_uppercase()
}

fn segments(sub_path: &str) -> Vec<String> {
    sub_path
        .split('\\')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    children: BTreeMap<String, Node>,
    values: Vec<StoredValue>,
}

#[derive(Debug, Clone)]
struct StoredValue {
    name: String,
    value_type: ValueType,
    data: Vec<u8>,
}

impl Node {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn find(&self, segments: &[String]) -> Option<&Node> {
        segments
            .iter()
            .try_fold(self, |node, segment| node.children.get(&fold(segment)))
    }

    fn find_mut(&mut self, segments: &[String]) -> Option<&mut Node> {
        let mut node = self;
        for segment in segments {
            node = node.children.get_mut(&fold(segment))?;
        }
        Some(node)
    }

    fn find_or_create(&mut self, segments: &[String]) -> &mut Node {
        let mut node = self;
        for segment in segments {
            node = node
                .children
                .entry(fold(segment))
                .or_insert_with(|| Node::named(segment));
        }
        node
    }

    fn value_index(&self, name: &str) -> Option<usize> {
        let folded = fold(name);
        self.values.iter().position(|value| fold(&value.name) == folded)
    }
}

/// In-memory registry backend. Clones share the same tree.
#[derive(Clone, Default)]
pub struct MemoryRegistry {
    roots: Arc<Mutex<HashMap<RootId, Node>>>,
}

impl MemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys below every hive, for diagnostics
    pub fn key_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            node.children.values().map(|child| 1 + count(child)).sum()
        }
        self.roots.lock().values().map(count).sum()
    }

    fn root_id(target: &KeyTarget) -> RootId {
        (target.computer.as_deref().map(fold), target.hive)
    }
}

impl RegistryBackend for MemoryRegistry {
    fn open(
        &self,
        target: &KeyTarget,
        access: Access,
        create: bool,
    ) -> Result<Option<Box<dyn KeyHandle>>> {
        let root_id = Self::root_id(target);
        let segments = segments(&target.sub_path);
        {
            let mut roots = self.roots.lock();
            let root = roots.entry(root_id.clone()).or_default();
            if create {
                root.find_or_create(&segments);
            } else if root.find(&segments).is_none() {
                return Ok(None);
            }
        }

        Ok(Some(Box::new(MemoryKey {
            roots: Arc::clone(&self.roots),
            root_id,
            segments,
            access,
            path: target.display_path(),
        })))
    }

    fn delete_key(&self, target: &KeyTarget) -> Result<bool> {
        let path = target.display_path();
        let segments = segments(&target.sub_path);
        let Some((last, parents)) = segments.split_last() else {
            return Err(Error::access("delete", path, ERROR_ACCESS_DENIED));
        };

        let mut roots = self.roots.lock();
        let root = roots.entry(Self::root_id(target)).or_default();
        let Some(parent) = root.find_mut(parents) else {
            return Ok(false);
        };

        let folded = fold(last);
        match parent.children.get(&folded) {
            None => Ok(false),
            Some(node) if !node.children.is_empty() => {
                Err(Error::access("delete", path, ERROR_ACCESS_DENIED))
            }
            Some(_) => {
                parent.children.remove(&folded);
                Ok(true)
            }
        }
    }
}

/// Open key in a [`MemoryRegistry`]
struct MemoryKey {
    roots: Arc<Mutex<HashMap<RootId, Node>>>,
    root_id: RootId,
    segments: Vec<String>,
    access: Access,
    path: String,
}

impl MemoryKey {
    fn with_node<T>(&self, f: impl FnOnce(&Node) -> T) -> Result<T> {
        let roots = self.roots.lock();
        roots
            .get(&self.root_id)
            .and_then(|root| root.find(&self.segments))
            .map(f)
            .ok_or_else(|| Error::access("read", &self.path, ERROR_KEY_DELETED))
    }

    fn with_node_mut<T>(&self, f: impl FnOnce(&mut Node) -> T) -> Result<T> {
        if self.access != Access::Write {
            return Err(Error::access("write", &self.path, ERROR_ACCESS_DENIED));
        }
        let mut roots = self.roots.lock();
        roots
            .get_mut(&self.root_id)
            .and_then(|root| root.find_mut(&self.segments))
            .map(f)
            .ok_or_else(|| Error::access("write", &self.path, ERROR_KEY_DELETED))
    }
}

impl KeyHandle for MemoryKey {
    fn subkey_name(&self, index: u32) -> Result<Option<String>> {
        self.with_node(|node| {
            node.children
                .values()
                .nth(index as usize)
                .map(|child| child.name.clone())
        })
    }

    fn value_name(&self, index: u32) -> Result<Option<String>> {
        self.with_node(|node| node.values.get(index as usize).map(|value| value.name.clone()))
    }

    fn value_count(&self) -> Result<u32> {
        self.with_node(|node| node.values.len() as u32)
    }

    fn query_value(&self, name: &str) -> Result<Option<(Vec<u8>, ValueType)>> {
        self.with_node(|node| {
            node.value_index(name).map(|index| {
                let value = &node.values[index];
                (value.data.clone(), value.value_type)
            })
        })
    }

    fn set_value(&self, name: &str, value_type: ValueType, data: &[u8]) -> Result<()> {
        self.with_node_mut(|node| {
            let stored = StoredValue {
                name: name.to_string(),
                value_type,
                data: data.to_vec(),
            };
            match node.value_index(name) {
                Some(index) => node.values[index] = stored,
                None => node.values.push(stored),
            }
        })
    }

    fn delete_value(&self, name: &str) -> Result<bool> {
        self.with_node_mut(|node| match node.value_index(name) {
            Some(index) => {
                node.values.remove(index);
                true
            }
            None => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ArchitectureView;

    fn target(sub_path: &str) -> KeyTarget {
        KeyTarget {
            hive: Hive::CurrentUser,
            sub_path: sub_path.to_string(),
            computer: None,
            view: ArchitectureView::Wow64,
        }
    }

    #[test]
    fn test_open_missing_and_create() {
        let registry = MemoryRegistry::new();
        assert!(registry
            .open(&target("A\\B"), Access::Read, false)
            .unwrap()
            .is_none());
        assert!(registry
            .open(&target("A\\B"), Access::Write, true)
            .unwrap()
            .is_some());
        assert!(registry
            .open(&target("a\\b"), Access::Read, false)
            .unwrap()
            .is_some());
        assert_eq!(registry.key_count(), 2);
    }

    #[test]
    fn test_hive_root_always_exists() {
        let registry = MemoryRegistry::new();
        assert!(registry.open(&target(""), Access::Read, false).unwrap().is_some());
        assert!(registry.delete_key(&target("")).is_err());
    }

    #[test]
    fn test_values_case_insensitive() {
        let registry = MemoryRegistry::new();
        let key = registry.open(&target("Env"), Access::Write, true).unwrap().unwrap();
        key.set_value("Path", ValueType::SZ, b"a\0").unwrap();
        key.set_value("PATH", ValueType::EXPAND_SZ, b"b\0").unwrap();
        assert_eq!(key.value_count().unwrap(), 1);
        assert_eq!(
            key.query_value("path").unwrap(),
            Some((b"b\0".to_vec(), ValueType::EXPAND_SZ))
        );
        assert_eq!(key.value_name(0).unwrap().as_deref(), Some("PATH"));
        assert!(key.delete_value("pAtH").unwrap());
        assert!(!key.delete_value("pAtH").unwrap());
    }

    #[test]
    fn test_read_handle_cannot_write() {
        let registry = MemoryRegistry::new();
        registry.open(&target("Env"), Access::Write, true).unwrap();
        let key = registry.open(&target("Env"), Access::Read, false).unwrap().unwrap();
        assert!(matches!(
            key.set_value("X", ValueType::SZ, b""),
            Err(Error::RegistryAccess { code: 5, .. })
        ));
    }

    #[test]
    fn test_deleted_key_handle_errors() {
        let registry = MemoryRegistry::new();
        let key = registry.open(&target("Gone"), Access::Read, true).unwrap().unwrap();
        assert!(registry.delete_key(&target("Gone")).unwrap());
        assert!(!registry.delete_key(&target("Gone")).unwrap());
        assert!(matches!(
            key.value_count(),
            Err(Error::RegistryAccess { code: 1018, .. })
        ));
    }

    #[test]
    fn test_delete_refuses_children() {
        let registry = MemoryRegistry::new();
        registry.open(&target("P\\C"), Access::Write, true).unwrap();
        assert!(registry.delete_key(&target("P")).is_err());
        assert!(registry.delete_key(&target("P\\C")).unwrap());
        assert!(registry.delete_key(&target("P")).unwrap());
    }

    #[test]
    fn test_remote_computers_are_separate() {
        let registry = MemoryRegistry::new();
        let mut remote = target("Only\\Remote");
        remote.computer = Some("build01".into());
        registry.open(&remote, Access::Write, true).unwrap();
        assert!(registry
            .open(&target("Only\\Remote"), Access::Read, false)
            .unwrap()
            .is_none());
        remote.computer = Some("BUILD01".into());
        assert!(registry.open(&remote, Access::Read, false).unwrap().is_some());
    }

    #[test]
    fn test_subkeys_sorted_by_name() {
        let registry = MemoryRegistry::new();
        for name in ["Zeta", "alpha", "Beta"] {
            registry
                .open(&target(&format!("Root\\{}", name)), Access::Write, true)
                .unwrap();
        }
        let key = registry.open(&target("Root"), Access::Read, false).unwrap().unwrap();
        let names: Vec<String> = (0..)
            .map_while(|index| key.subkey_name(index).unwrap())
            .collect();
        assert_eq!(names, vec!["alpha", "Beta", "Zeta"]);
    }
}
