//! Delayed, deduplicated environment-change broadcast
//!
//! Every set/delete on an environment mapping should tell the rest of the
//! system that the environment changed. Each notification can wait on hung
//! windows, so a batch of edits inside [`Broadcaster::delay`] collapses into a
//! single notification sent when the outermost scope ends.
//!
//! ```ignore
//! let _scope = env.delayed_broadcast();
//! env.set("VAR_B", "value b")?;
//! env.set("VAR_C", "value c")?;
//! env.remove("VAR_A")?;
//! // one broadcast when `_scope` drops
//! ```
//!
//! The flags live in `Cell`s: a `Broadcaster` is shared with `Rc` and is not
//! safe to use from several threads. Callers that need that must serialize
//! access themselves.

use std::cell::Cell;
use std::time::Duration;

use crate::application::ports::SettingsNotifier;

/// Bound on how long a single unresponsive window may stall the broadcast
pub const DEFAULT_BROADCAST_TIMEOUT: Duration = Duration::from_millis(1000);

const TARGET: &str = "casement::env_var::broadcast";

/// Broadcast coordinator: an enabled flag, a required flag and the notifier
pub struct Broadcaster {
    enabled: Cell<bool>,
    required: Cell<bool>,
    timeout: Duration,
    notifier: Box<dyn SettingsNotifier>,
}

impl Broadcaster {
    /// Create an armed broadcaster
    pub fn new(notifier: impl SettingsNotifier + 'static) -> Self {
        Self::from_boxed(Box::new(notifier))
    }

    /// Create from an already boxed notifier
    pub fn from_boxed(notifier: Box<dyn SettingsNotifier>) -> Self {
        Self {
            enabled: Cell::new(true),
            required: Cell::new(false),
            timeout: DEFAULT_BROADCAST_TIMEOUT,
            notifier,
        }
    }

    /// Set the per-window timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the initial enabled state
    pub fn with_enabled(self, enabled: bool) -> Self {
        self.enabled.set(enabled);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn is_required(&self) -> bool {
        self.required.get()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Record that a change happened and a broadcast is owed
    pub fn mark_required(&self) {
        self.required.set(true);
    }

    /// Send the notification now, unless suppressed by an open scope
    pub fn broadcast(&self) {
        if !self.enabled.get() {
            log::debug!(target: TARGET, "Skipping broadcasting that the environment was changed");
            return;
        }

        log::debug!(target: TARGET, "Broadcasting that the environment was changed");
        self.notifier.notify_environment_changed(self.timeout);
        self.required.set(false);
    }

    /// Suppress broadcasts until the returned guard drops. Scopes nest; only
    /// the outermost one fires, and only if a change was recorded.
    pub fn delay(&self) -> DelayGuard<'_> {
        let saved = self.enabled.replace(false);
        DelayGuard {
            broadcaster: self,
            saved,
        }
    }

    /// Run `f` inside a delayed-broadcast scope
    pub fn delayed<T>(&self, f: impl FnOnce() -> T) -> T {
        let _scope = self.delay();
        f()
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("enabled", &self.enabled.get())
            .field("required", &self.required.get())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Scope returned by [`Broadcaster::delay`]
#[must_use = "broadcasts are only delayed while the guard is alive"]
pub struct DelayGuard<'a> {
    broadcaster: &'a Broadcaster,
    saved: bool,
}

impl Drop for DelayGuard<'_> {
    fn drop(&mut self) {
        self.broadcaster.enabled.set(self.saved);
        if self.broadcaster.enabled.get() && self.broadcaster.required.get() {
            self.broadcaster.broadcast();
        }
    }
}
