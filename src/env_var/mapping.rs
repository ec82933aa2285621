//! EnvVarMapping - environment variables as stored in the registry
//!
//! Values are read and written raw; `%VAR%` references inside them are not
//! expanded. Every set/remove notifies other applications through the shared
//! [`Broadcaster`]; wrap a batch of edits in [`EnvVarMapping::delayed_broadcast`]
//! to notify once:
//!
//! ```ignore
//! let user_env = EnvVarMapping::new(&registry, false, broadcaster);
//! {
//!     let _scope = user_env.delayed_broadcast();
//!     user_env.set("VAR_B", "value b")?;
//!     user_env.set("VAR_C", "value c")?;
//!     user_env.remove("VAR_A")?;
//! }
//! ```

use std::rc::Rc;

use crate::application::ports::PathResolver;
use crate::application::services::{Broadcaster, DelayGuard};
use crate::domain::errors::{Error, Result};
use crate::domain::locations::{self, Scope};
use crate::domain::value_objects::{RegData, ValueType};
use crate::env_var::normalize::{self, NormalizeOptions};
use crate::platform;
use crate::registry::{RegKey, Registry};

const MODIFY_TARGET: &str = "casement::env_var::modify";

/// Key/value container contract for environment stores
pub trait EnvironmentStore {
    /// Value of a variable, `None` if it is not set. Fails with `NotText`
    /// when the stored data has no text form.
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Set a variable
    fn set(&self, name: &str, value: &str) -> Result<()>;

    /// Remove a variable. Fails with `EntryNotFound` if it is not set.
    fn remove(&self, name: &str) -> Result<()>;

    /// Variable names
    fn names(&self) -> Result<Box<dyn Iterator<Item = String>>>;

    /// Number of variables
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.get(name)?.is_some())
    }

    /// Name/value pairs. Names that vanish while listing and values without
    /// a text form are skipped.
    fn items(&self) -> Result<Vec<(String, String)>> {
        let mut items = Vec::new();
        for name in self.names()? {
            match self.get(&name) {
                Ok(Some(value)) => items.push((name, value)),
                Ok(None) | Err(Error::NotText { .. }) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(items)
    }
}

/// User or system environment variables backed by a registry key
#[derive(Debug)]
pub struct EnvVarMapping {
    key: RegKey,
    broadcaster: Rc<Broadcaster>,
}

impl EnvVarMapping {
    /// Mapping over `HKEY_CURRENT_USER\Environment`, or the system
    /// environment key under `HKEY_LOCAL_MACHINE` when `system` is true
    pub fn new(registry: &Registry, system: bool, broadcaster: Rc<Broadcaster>) -> Self {
        let (hive, sub_path) = locations::environment(Scope::from_system(system));
        Self::with_key(RegKey::from_parts(registry.clone(), hive, sub_path), broadcaster)
    }

    /// Mapping over an arbitrary key
    pub fn with_key(key: RegKey, broadcaster: Rc<Broadcaster>) -> Self {
        Self { key, broadcaster }
    }

    pub fn key(&self) -> &RegKey {
        &self.key
    }

    pub fn broadcaster(&self) -> &Rc<Broadcaster> {
        &self.broadcaster
    }

    /// Suppress broadcasts until the guard drops, then send one if anything
    /// changed
    pub fn delayed_broadcast(&self) -> DelayGuard<'_> {
        self.broadcaster.delay()
    }

    /// Raw data of a variable
    pub fn get_data(&self, name: &str) -> Result<Option<RegData>> {
        match self.key.entry(name).value() {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Set a variable with an explicit value type
    pub fn set_typed(
        &self,
        name: &str,
        value: impl Into<RegData>,
        value_type: ValueType,
    ) -> Result<()> {
        let value = value.into();
        let entry = self.key.entry(name);
        let _scope = self.broadcaster.delay();
        log::debug!(target: MODIFY_TARGET, "Setting env var: \"{}\" to {:?}", name, value);
        entry.set(value, Some(value_type))?;
        self.broadcaster.mark_required();
        Ok(())
    }

    /// Normalize a path with the host's path resolver. Independent of any
    /// mapping: variables expand from the process environment.
    pub fn normalize_path(path: &str, options: &NormalizeOptions) -> Result<String> {
        let resolver = platform::default_path_resolver();
        Self::normalize_path_with(path, options, resolver.as_ref())
    }

    /// Normalize a path with a given resolver
    pub fn normalize_path_with(
        path: &str,
        options: &NormalizeOptions,
        resolver: &dyn PathResolver,
    ) -> Result<String> {
        normalize::normalize_path(path, options, resolver)
    }
}

impl EnvironmentStore for EnvVarMapping {
    fn get(&self, name: &str) -> Result<Option<String>> {
        let (data, value_type) = match self.key.entry(name).value_info() {
            Ok(info) => info,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };
        match data {
            RegData::String(value) => Ok(Some(value)),
            RegData::MultiString(items) => Ok(Some(items.join(";"))),
            RegData::Dword(value) => Ok(Some(value.to_string())),
            RegData::Qword(value) => Ok(Some(value.to_string())),
            RegData::Binary(_) => Err(Error::NotText {
                name: name.to_string(),
                value_type,
            }),
        }
    }

    /// Any stored value counts, whatever its type
    fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.get_data(name)?.is_some())
    }

    /// Stored as `REG_EXPAND_SZ`
    fn set(&self, name: &str, value: &str) -> Result<()> {
        self.set_typed(name, value, ValueType::EXPAND_SZ)
    }

    fn remove(&self, name: &str) -> Result<()> {
        let entry = self.key.entry(name);
        let _scope = self.broadcaster.delay();
        log::debug!(target: MODIFY_TARGET, "Deleting env var: \"{}\"", name);
        entry.delete()?;
        self.broadcaster.mark_required();
        Ok(())
    }

    fn names(&self) -> Result<Box<dyn Iterator<Item = String>>> {
        Ok(Box::new(self.key.entry_names()?))
    }

    fn len(&self) -> Result<usize> {
        match self.key.open_handle(false, false)? {
            Some(handle) => Ok(handle.value_count()? as usize),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateways::RecordingNotifier;

    const TEST_VAR_NAME: &str = "CASEMENT_TEST_DELETE_ME_ENV_VAR";

    struct Fixture {
        registry: Registry,
        notifier: RecordingNotifier,
        broadcaster: Rc<Broadcaster>,
    }

    impl Fixture {
        fn new() -> Self {
            let notifier = RecordingNotifier::new();
            Self {
                registry: Registry::in_memory(),
                broadcaster: Rc::new(Broadcaster::new(notifier.clone())),
                notifier,
            }
        }

        fn env(&self, system: bool) -> EnvVarMapping {
            EnvVarMapping::new(&self.registry, system, Rc::clone(&self.broadcaster))
        }
    }

    #[test]
    fn test_backing_keys() {
        let fixture = Fixture::new();
        assert_eq!(
            fixture.env(false).key().path(),
            "HKEY_CURRENT_USER\\Environment"
        );
        assert_eq!(
            fixture.env(true).key().path(),
            "HKEY_LOCAL_MACHINE\\SYSTEM\\CurrentControlSet\\Control\\Session Manager\\Environment"
        );
    }

    #[test]
    fn test_envvar_modify() {
        let fixture = Fixture::new();
        let uenv = fixture.env(false);
        assert!(!uenv.contains(TEST_VAR_NAME).unwrap());

        uenv.set(TEST_VAR_NAME, "TEST").unwrap();
        assert_eq!(uenv.get(TEST_VAR_NAME).unwrap().as_deref(), Some("TEST"));
        uenv.set(TEST_VAR_NAME, "TEST 2").unwrap();
        assert_eq!(uenv.get(TEST_VAR_NAME).unwrap().as_deref(), Some("TEST 2"));

        let items = uenv.items().unwrap();
        assert!(items.contains(&(TEST_VAR_NAME.to_string(), "TEST 2".to_string())));
        assert!(uenv.len().unwrap() >= 1);

        uenv.remove(TEST_VAR_NAME).unwrap();
        assert!(!uenv.contains(TEST_VAR_NAME).unwrap());
        assert_eq!(uenv.get(TEST_VAR_NAME).unwrap(), None);
    }

    #[test]
    fn test_scenario_set_iterate_delete() {
        let fixture = Fixture::new();
        let env = fixture.env(false);
        env.set("CASEMENT_TEST_X", "A").unwrap();
        assert_eq!(env.get("CASEMENT_TEST_X").unwrap().as_deref(), Some("A"));
        assert!(env.names().unwrap().any(|name| name == "CASEMENT_TEST_X"));
        env.remove("CASEMENT_TEST_X").unwrap();
        assert!(!env.contains("CASEMENT_TEST_X").unwrap());
    }

    #[test]
    fn test_user_and_system_are_separate() {
        let fixture = Fixture::new();
        fixture.env(true).set(TEST_VAR_NAME, "system").unwrap();
        assert!(!fixture.env(false).contains(TEST_VAR_NAME).unwrap());
        assert_eq!(fixture.env(true).len().unwrap(), 1);
    }

    #[test]
    fn test_set_defaults_to_expandable_string() {
        let fixture = Fixture::new();
        let env = fixture.env(false);
        env.set(TEST_VAR_NAME, "%USERPROFILE%\\bin").unwrap();
        let entry = env.key().entry(TEST_VAR_NAME);
        assert_eq!(entry.value_type().unwrap(), ValueType::EXPAND_SZ);
        // stored raw, not expanded
        assert_eq!(
            env.get(TEST_VAR_NAME).unwrap().as_deref(),
            Some("%USERPROFILE%\\bin")
        );

        env.set_typed(TEST_VAR_NAME, "plain", ValueType::SZ).unwrap();
        assert_eq!(entry.value_type().unwrap(), ValueType::SZ);
    }

    #[test]
    fn test_len_of_missing_key() {
        let fixture = Fixture::new();
        let bad = EnvVarMapping::with_key(
            fixture.registry.parse("HKEY_CURRENT_USER\\BadEnvironment").unwrap(),
            Rc::clone(&fixture.broadcaster),
        );
        assert_eq!(bad.len().unwrap(), 0);
        assert!(bad.is_empty().unwrap());
        assert_eq!(bad.names().unwrap().count(), 0);
    }

    #[test]
    fn test_remove_missing() {
        let fixture = Fixture::new();
        let env = fixture.env(false);
        assert!(env.remove(TEST_VAR_NAME).unwrap_err().is_not_found());
        assert_eq!(fixture.notifier.calls(), 0);
        assert!(!fixture.broadcaster.is_required());
        assert!(fixture.broadcaster.is_enabled());
    }

    #[test]
    fn test_broadcast() {
        let fixture = Fixture::new();
        let uenv = fixture.env(false);
        let b = &fixture.broadcaster;

        assert!(b.is_enabled());
        assert!(!b.is_required());
        uenv.set(TEST_VAR_NAME, "TEST").unwrap();
        assert!(b.is_enabled());
        assert!(!b.is_required());
        assert_eq!(fixture.notifier.calls(), 1);

        fixture.notifier.reset();
        uenv.remove(TEST_VAR_NAME).unwrap();
        assert!(b.is_enabled());
        assert!(!b.is_required());
        assert_eq!(fixture.notifier.calls(), 1);
    }

    #[test]
    fn test_each_standalone_edit_broadcasts() {
        let fixture = Fixture::new();
        let env = fixture.env(false);
        for i in 0..3 {
            env.set(TEST_VAR_NAME, &i.to_string()).unwrap();
        }
        assert_eq!(fixture.notifier.calls(), 3);
    }

    #[test]
    fn test_delayed_broadcast() {
        let fixture = Fixture::new();
        let uenv = fixture.env(false);
        let senv = fixture.env(true);
        let b = &fixture.broadcaster;

        {
            let _scope = uenv.delayed_broadcast();
            assert!(!b.is_enabled());
            assert!(!b.is_required());
            uenv.set(TEST_VAR_NAME, "TEST").unwrap();
            uenv.set("CASEMENT_TEST_OTHER", "TEST").unwrap();
            senv.set(TEST_VAR_NAME, "TEST").unwrap();
            uenv.remove("CASEMENT_TEST_OTHER").unwrap();
            assert!(!b.is_enabled());
            assert!(b.is_required());
            assert_eq!(fixture.notifier.calls(), 0);
        }
        assert!(b.is_enabled());
        assert!(!b.is_required());
        assert_eq!(fixture.notifier.calls(), 1);

        fixture.notifier.reset();
        {
            let _scope = uenv.delayed_broadcast();
            assert!(!b.is_required());
        }
        assert!(b.is_enabled());
        assert_eq!(fixture.notifier.calls(), 0);
    }

    #[test]
    fn test_failed_edit_inside_scope() {
        let fixture = Fixture::new();
        let env = fixture.env(false);
        {
            let _scope = env.delayed_broadcast();
            env.set(TEST_VAR_NAME, "TEST").unwrap();
            assert!(env.remove("CASEMENT_NOT_SET").is_err());
        }
        assert_eq!(fixture.notifier.calls(), 1);
    }

    #[test]
    fn test_non_string_values() {
        let fixture = Fixture::new();
        let env = fixture.env(false);
        env.set_typed("COUNT", 7u32, ValueType::DWORD).unwrap();
        assert_eq!(env.get("COUNT").unwrap().as_deref(), Some("7"));
        env.set_typed("BLOB", vec![1u8, 2], ValueType::BINARY).unwrap();
        assert!(matches!(
            env.get("BLOB"),
            Err(Error::NotText { value_type: ValueType::BINARY, .. })
        ));
        assert_eq!(
            env.get_data("BLOB").unwrap(),
            Some(RegData::Binary(vec![1, 2]))
        );
    }

    #[test]
    fn test_binary_value_is_still_a_member() {
        let fixture = Fixture::new();
        let env = fixture.env(false);
        env.set("CASEMENT_TEST_TEXT", "text").unwrap();
        env.set_typed("BLOB", vec![1u8, 2], ValueType::BINARY).unwrap();

        assert!(env.contains("BLOB").unwrap());
        assert!(env.contains("blob").unwrap());
        assert!(!env.contains("CASEMENT_NOT_SET").unwrap());
        assert_eq!(env.len().unwrap(), 2);

        let items = env.items().unwrap();
        assert_eq!(
            items,
            vec![("CASEMENT_TEST_TEXT".to_string(), "text".to_string())]
        );
    }

    #[test]
    fn test_normalize_path_is_independent_of_mapping() {
        std::env::set_var("CASEMENT_TEST_MAPPING_NORMALIZE", "C:/tools");
        let out = EnvVarMapping::normalize_path(
            "%CASEMENT_TEST_MAPPING_NORMALIZE%/bin",
            &NormalizeOptions::default(),
        )
        .unwrap();
        assert_eq!(out, "C:\\tools\\bin");
    }
}
