//! RecordingNotifier - counts broadcasts instead of sending them

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::application::ports::SettingsNotifier;

/// Notifier that records each broadcast. Clones share the same counters.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    calls: Rc<Cell<usize>>,
    last_timeout: Rc<RefCell<Option<Duration>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of broadcasts sent so far
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Timeout passed to the latest broadcast
    pub fn last_timeout(&self) -> Option<Duration> {
        *self.last_timeout.borrow()
    }

    pub fn reset(&self) {
        self.calls.set(0);
        self.last_timeout.replace(None);
    }
}

impl SettingsNotifier for RecordingNotifier {
    fn notify_environment_changed(&self, timeout: Duration) {
        self.calls.set(self.calls.get() + 1);
        self.last_timeout.replace(Some(timeout));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_counts() {
        let notifier = RecordingNotifier::new();
        let clone = notifier.clone();
        clone.notify_environment_changed(Duration::from_millis(5));
        assert_eq!(notifier.calls(), 1);
        assert_eq!(notifier.last_timeout(), Some(Duration::from_millis(5)));

        notifier.reset();
        assert_eq!(clone.calls(), 0);
        assert_eq!(clone.last_timeout(), None);
    }
}
