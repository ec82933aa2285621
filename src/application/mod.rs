//! Application Layer - Ports and coordinating services
//!
//! Ports are the traits that platform code implements; services hold the
//! state that spans several registry operations.

pub mod ports;
pub mod services;
