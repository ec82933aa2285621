//! Fallbacks for hosts without the Win32 API

use std::path::{Path, PathBuf};

use crate::application::ports::PathResolver;
use crate::domain::errors::{Error, Result};

/// Path resolver for file systems without 8.3 names. Both forms are the
/// path itself, once it is known to exist.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExistingPathResolver;

impl ExistingPathResolver {
    fn existing(path: &str) -> Result<String> {
        if Path::new(path).exists() {
            Ok(path.to_string())
        } else {
            Err(Error::PathNotFound(PathBuf::from(path)))
        }
    }
}

impl PathResolver for ExistingPathResolver {
    fn short_path(&self, path: &str) -> Result<String> {
        Self::existing(path)
    }

    fn long_path(&self, path: &str) -> Result<String> {
        Self::existing(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_existing_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().to_string();
        let resolver = ExistingPathResolver;
        assert_eq!(resolver.short_path(&path).unwrap(), path);
        assert_eq!(resolver.long_path(&path).unwrap(), path);

        drop(file);
        assert!(matches!(
            resolver.short_path(&path),
            Err(Error::PathNotFound(missing)) if missing == PathBuf::from(&path)
        ));
    }
}
