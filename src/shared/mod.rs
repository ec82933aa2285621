//! Shared Utilities Module
//!
//! Configuration and logging used across layers.

pub mod config;
pub mod logging;

pub use config::CasementConfig;
pub use logging::FileLogger;
