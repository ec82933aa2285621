//! Application Services

pub mod broadcast;

pub use broadcast::{Broadcaster, DelayGuard, DEFAULT_BROADCAST_TIMEOUT};
