//! NotifierPort - interface for the settings-changed broadcast

use std::time::Duration;

/// Sends the system-wide "environment changed" notification
pub trait SettingsNotifier {
    /// Notify all top-level windows. Must not block longer than `timeout`
    /// per unresponsive receiver; a timeout is not an error.
    fn notify_environment_changed(&self, timeout: Duration);
}

/// Notifier that does nothing (hosts without a window system)
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNotifier;

impl SettingsNotifier for NullNotifier {
    fn notify_environment_changed(&self, _timeout: Duration) {
        log::trace!(
            target: "casement::env_var::broadcast",
            "No window system, broadcast dropped"
        );
    }
}
