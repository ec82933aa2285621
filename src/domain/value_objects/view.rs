//! WOW64 registry view selection

use std::fmt;

use crate::domain::errors::{Error, Result};

/// Which WOW64 view a key is opened through
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ArchitectureView {
    /// No redirection override
    Native,
    /// KEY_WOW64_32KEY
    Wow32,
    /// KEY_WOW64_64KEY
    #[default]
    Wow64,
}

impl ArchitectureView {
    /// Parse the numeric form (0, 32 or 64)
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            0 => Ok(ArchitectureView::Native),
            32 => Ok(ArchitectureView::Wow32),
            64 => Ok(ArchitectureView::Wow64),
            other => Err(Error::InvalidView(other)),
        }
    }

    /// Numeric form
    pub const fn bits(self) -> u32 {
        match self {
            ArchitectureView::Native => 0,
            ArchitectureView::Wow32 => 32,
            ArchitectureView::Wow64 => 64,
        }
    }

    /// Access mask bits OR'd into the desired access
    pub const fn sam_flags(self) -> u32 {
        match self {
            ArchitectureView::Native => 0,
            ArchitectureView::Wow32 => 0x0200,
            ArchitectureView::Wow64 => 0x0100,
        }
    }
}

impl TryFrom<u32> for ArchitectureView {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Self> {
        ArchitectureView::from_bits(bits)
    }
}

impl fmt::Display for ArchitectureView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}
