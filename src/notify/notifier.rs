use notify_rust::Notification;

use crate::error::{Error, Result};
use crate::pomodoro::PomodoroMode;

/// Surfaces the end of a countdown to the user.
///
/// Called from the blocking pool, so implementations may block.
pub trait ExpiryNotifier: Send + Sync {
    fn time_expired(&self, mode: PomodoroMode, message: &str) -> Result<()>;
}

/// Desktop notification through the platform notification service.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl ExpiryNotifier for DesktopNotifier {
    fn time_expired(&self, mode: PomodoroMode, message: &str) -> Result<()> {
        Notification::new()
            .summary("Focus It - Pomodoro Alert")
            .body(&format!("{} {}", mode.emoji(), message))
            .timeout(0) // No auto-dismiss
            .show()
            .map_err(|err| Error::Notification(err.to_string()))?;
        Ok(())
    }
}

/// Only writes the expiry to the log. Used when notifications are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl ExpiryNotifier for LogNotifier {
    fn time_expired(&self, mode: PomodoroMode, message: &str) -> Result<()> {
        tracing::info!(mode = %mode, "🔔 {}", message);
        Ok(())
    }
}
