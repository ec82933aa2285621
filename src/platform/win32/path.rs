//! Short (8.3) and long path forms via the file system API

use std::path::PathBuf;

use windows::core::PCWSTR;
use windows::Win32::Storage::FileSystem::{GetLongPathNameW, GetShortPathNameW};

use crate::application::ports::PathResolver;
use crate::domain::errors::{Error, Result};

/// Resolves path forms with `GetShortPathNameW`/`GetLongPathNameW`
#[derive(Clone, Copy, Debug, Default)]
pub struct Win32PathResolver;

/// Run one of the two-call Win32 path functions: the first call reports the
/// buffer size, the second fills it.
fn resolve<F>(path: &str, mut call: F) -> Result<String>
where
    F: FnMut(PCWSTR, Option<&mut [u16]>) -> u32,
{
    let source: Vec<u16> = path.encode_utf16().chain(std::iter::once(0)).collect();
    let not_found = || Error::PathNotFound(PathBuf::from(path));

    let mut needed = call(PCWSTR(source.as_ptr()), None);
    loop {
        if needed == 0 {
            return Err(not_found());
        }
        let mut buffer = vec![0u16; needed as usize];
        let written = call(PCWSTR(source.as_ptr()), Some(&mut buffer));
        if written == 0 {
            return Err(not_found());
        }
        if (written as usize) < buffer.len() {
            buffer.truncate(written as usize);
            return Ok(String::from_utf16_lossy(&buffer));
        }
        needed = written;
    }
}

impl PathResolver for Win32PathResolver {
    fn short_path(&self, path: &str) -> Result<String> {
        resolve(path, |source, buffer| unsafe { GetShortPathNameW(source, buffer) })
    }

    fn long_path(&self, path: &str) -> Result<String> {
        resolve(path, |source, buffer| unsafe { GetLongPathNameW(source, buffer) })
    }
}
