//! Adapters Layer - In-process implementations of the ports

pub mod gateways;
