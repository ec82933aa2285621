//! Native registry backend over the Win32 `Reg*` API

use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::{
    ERROR_FILE_NOT_FOUND, ERROR_MORE_DATA, ERROR_NO_MORE_ITEMS, ERROR_PATH_NOT_FOUND,
    ERROR_SUCCESS, WIN32_ERROR,
};
use windows::Win32::System::Registry::{
    RegCloseKey, RegConnectRegistryW, RegCreateKeyExW, RegDeleteKeyExW, RegDeleteValueW,
    RegEnumKeyExW, RegEnumValueW, RegOpenKeyExW, RegQueryInfoKeyW, RegQueryValueExW,
    RegSetValueExW, HKEY, HKEY_CLASSES_ROOT, HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER,
    HKEY_DYN_DATA, HKEY_LOCAL_MACHINE, HKEY_PERFORMANCE_DATA, HKEY_USERS, KEY_READ, KEY_WRITE,
    REG_OPTION_NON_VOLATILE, REG_SAM_FLAGS, REG_VALUE_TYPE,
};

use crate::application::ports::{Access, KeyHandle, KeyTarget, RegistryBackend};
use crate::domain::errors::{Error, Result};
use crate::domain::value_objects::{Hive, ValueType};

/// Longest key name the registry allows, plus the terminator
const MAX_KEY_NAME: usize = 256;
/// Longest value name the registry allows, plus the terminator
const MAX_VALUE_NAME: usize = 16384;

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn predefined(hive: Hive) -> HKEY {
    match hive {
        Hive::ClassesRoot => HKEY_CLASSES_ROOT,
        Hive::CurrentConfig => HKEY_CURRENT_CONFIG,
        Hive::CurrentUser => HKEY_CURRENT_USER,
        Hive::DynData => HKEY_DYN_DATA,
        Hive::LocalMachine => HKEY_LOCAL_MACHINE,
        Hive::PerformanceData => HKEY_PERFORMANCE_DATA,
        Hive::Users => HKEY_USERS,
    }
}

fn is_not_found(status: WIN32_ERROR) -> bool {
    status == ERROR_FILE_NOT_FOUND || status == ERROR_PATH_NOT_FOUND
}

/// Closes the wrapped key on drop
struct KeyGuard(HKEY);

impl Drop for KeyGuard {
    fn drop(&mut self) {
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

/// Root handle for a target: the predefined key locally, or a connection to
/// the remote computer's hive that is closed with the guard.
fn connect(target: &KeyTarget) -> Result<(HKEY, Option<KeyGuard>)> {
    let base = predefined(target.hive);
    let Some(computer) = &target.computer else {
        return Ok((base, None));
    };

    let name = wide(computer);
    let mut connection = HKEY::default();
    let status = unsafe { RegConnectRegistryW(PCWSTR(name.as_ptr()), base, &mut connection) };
    if status != ERROR_SUCCESS {
        return Err(Error::access("connect", target.display_path(), status.0));
    }
    Ok((connection, Some(KeyGuard(connection))))
}

/// Registry backend for the host (and remote hosts via `RegConnectRegistryW`)
#[derive(Clone, Copy, Debug, Default)]
pub struct Win32Registry;

impl RegistryBackend for Win32Registry {
    fn open(
        &self,
        target: &KeyTarget,
        access: Access,
        create: bool,
    ) -> Result<Option<Box<dyn KeyHandle>>> {
        let path = target.display_path();
        let (base, connection) = connect(target)?;
        let rights = match access {
            Access::Read => KEY_READ,
            Access::Write => KEY_WRITE,
        };
        let sam = REG_SAM_FLAGS(rights.0 | target.view.sam_flags());
        let sub_path = wide(&target.sub_path);

        let mut hkey = HKEY::default();
        let status = unsafe {
            if create {
                RegCreateKeyExW(
                    base,
                    PCWSTR(sub_path.as_ptr()),
                    0,
                    PCWSTR::null(),
                    REG_OPTION_NON_VOLATILE,
                    sam,
                    None,
                    &mut hkey,
                    None,
                )
            } else {
                RegOpenKeyExW(base, PCWSTR(sub_path.as_ptr()), 0, sam, &mut hkey)
            }
        };

        if !create && is_not_found(status) {
            return Ok(None);
        }
        if status != ERROR_SUCCESS {
            let operation = if create { "create" } else { "open" };
            return Err(Error::access(operation, path, status.0));
        }

        Ok(Some(Box::new(Win32Key {
            key: KeyGuard(hkey),
            _connection: connection,
            path,
        })))
    }

    fn delete_key(&self, target: &KeyTarget) -> Result<bool> {
        let (base, _connection) = connect(target)?;
        let sub_path = wide(&target.sub_path);
        let status = unsafe {
            RegDeleteKeyExW(base, PCWSTR(sub_path.as_ptr()), target.view.sam_flags(), 0)
        };

        if is_not_found(status) {
            return Ok(false);
        }
        if status != ERROR_SUCCESS {
            return Err(Error::access("delete", target.display_path(), status.0));
        }
        Ok(true)
    }
}

/// Open native key. Field order matters: the key closes before the
/// connection it was opened through.
struct Win32Key {
    key: KeyGuard,
    _connection: Option<KeyGuard>,
    path: String,
}

impl Win32Key {
    fn check(&self, operation: &'static str, status: WIN32_ERROR) -> Result<()> {
        if status == ERROR_SUCCESS {
            Ok(())
        } else {
            Err(Error::access(operation, &self.path, status.0))
        }
    }
}

impl KeyHandle for Win32Key {
    fn subkey_name(&self, index: u32) -> Result<Option<String>> {
        let mut buffer = [0u16; MAX_KEY_NAME];
        let mut len = buffer.len() as u32;
        let status = unsafe {
            RegEnumKeyExW(
                self.key.0,
                index,
                PWSTR(buffer.as_mut_ptr()),
                &mut len,
                None,
                PWSTR::null(),
                None,
                None,
            )
        };

        if status == ERROR_NO_MORE_ITEMS {
            return Ok(None);
        }
        self.check("enumerate keys", status)?;
        Ok(Some(String::from_utf16_lossy(&buffer[..len as usize])))
    }

    fn value_name(&self, index: u32) -> Result<Option<String>> {
        let mut buffer = vec![0u16; MAX_VALUE_NAME];
        let mut len = buffer.len() as u32;
        let status = unsafe {
            RegEnumValueW(
                self.key.0,
                index,
                PWSTR(buffer.as_mut_ptr()),
                &mut len,
                None,
                None,
                None,
                None,
            )
        };

        if status == ERROR_NO_MORE_ITEMS {
            return Ok(None);
        }
        self.check("enumerate values", status)?;
        Ok(Some(String::from_utf16_lossy(&buffer[..len as usize])))
    }

    fn value_count(&self) -> Result<u32> {
        let mut count = 0u32;
        let status = unsafe {
            RegQueryInfoKeyW(
                self.key.0,
                PWSTR::null(),
                None,
                None,
                None,
                None,
                None,
                Some(&mut count as *mut u32),
                None,
                None,
                None,
                None,
            )
        };
        self.check("query info", status)?;
        Ok(count)
    }

    fn query_value(&self, name: &str) -> Result<Option<(Vec<u8>, ValueType)>> {
        let name = wide(name);
        let mut value_type = REG_VALUE_TYPE(0);
        let mut size = 0u32;
        let status = unsafe {
            RegQueryValueExW(
                self.key.0,
                PCWSTR(name.as_ptr()),
                None,
                Some(&mut value_type as *mut REG_VALUE_TYPE),
                None,
                Some(&mut size as *mut u32),
            )
        };
        if is_not_found(status) {
            return Ok(None);
        }
        self.check("query value", status)?;

        // The value may grow between the size query and the read.
        loop {
            let mut data = vec![0u8; size as usize];
            let status = unsafe {
                RegQueryValueExW(
                    self.key.0,
                    PCWSTR(name.as_ptr()),
                    None,
                    Some(&mut value_type as *mut REG_VALUE_TYPE),
                    Some(data.as_mut_ptr()),
                    Some(&mut size as *mut u32),
                )
            };
            if status == ERROR_MORE_DATA {
                continue;
            }
            if is_not_found(status) {
                return Ok(None);
            }
            self.check("query value", status)?;
            data.truncate(size as usize);
            return Ok(Some((data, ValueType(value_type.0))));
        }
    }

    fn set_value(&self, name: &str, value_type: ValueType, data: &[u8]) -> Result<()> {
        let name = wide(name);
        let status = unsafe {
            RegSetValueExW(
                self.key.0,
                PCWSTR(name.as_ptr()),
                0,
                REG_VALUE_TYPE(value_type.0),
                Some(data),
            )
        };
        self.check("set value", status)
    }

    fn delete_value(&self, name: &str) -> Result<bool> {
        let name = wide(name);
        let status = unsafe { RegDeleteValueW(self.key.0, PCWSTR(name.as_ptr())) };
        if is_not_found(status) {
            return Ok(false);
        }
        self.check("delete value", status)?;
        Ok(true)
    }
}
