//! WM_SETTINGCHANGE broadcast

use std::time::Duration;

use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    SendMessageTimeoutW, HWND_BROADCAST, SMTO_ABORTIFHUNG, WM_SETTINGCHANGE,
};

use crate::application::ports::SettingsNotifier;

const TARGET: &str = "casement::env_var::broadcast";

/// Sends `WM_SETTINGCHANGE` with the "Environment" area to every top-level
/// window. Uses `SendMessageTimeoutW` so hung windows cannot block the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct Win32Notifier;

impl SettingsNotifier for Win32Notifier {
    fn notify_environment_changed(&self, timeout: Duration) {
        let area: Vec<u16> = "Environment"
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();
        let timeout_ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let mut result = 0usize;

        let sent = unsafe {
            SendMessageTimeoutW(
                HWND_BROADCAST,
                WM_SETTINGCHANGE,
                WPARAM(0),
                LPARAM(area.as_ptr() as isize),
                SMTO_ABORTIFHUNG,
                timeout_ms,
                Some(&mut result as *mut usize),
            )
        };

        if sent.0 == 0 {
            log::debug!(target: TARGET, "WM_SETTINGCHANGE timed out or failed");
        }
    }
}
