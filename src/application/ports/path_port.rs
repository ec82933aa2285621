//! PathPort - short (8.3) and long path resolution
//!
//! Both directions require the path to exist on disk.

use crate::domain::errors::Result;

/// Port interface for path form resolution
pub trait PathResolver {
    /// Short (8.3) form of an existing path
    fn short_path(&self, path: &str) -> Result<String>;

    /// Long form of an existing path
    fn long_path(&self, path: &str) -> Result<String>;
}
