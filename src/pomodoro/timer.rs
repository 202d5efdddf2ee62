//! The countdown state machine.

use std::time::Duration;

use super::driver::{DriverId, TickScheduler};
use super::pomodoro::{PomodoroMode, TICK_INTERVAL_MS, format_time};

/// What a single tick did to the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick came from a driver that is no longer active.
    Stale,
    TimeChanged { remaining_seconds: u32 },
    /// The countdown finished; the driver has been stopped.
    TimeExpired { mode: PomodoroMode },
}

struct ActiveDriver<H> {
    id: DriverId,
    handle: H,
}

/// Single pomodoro countdown.
///
/// The timer owns its driver handle, so `pause`, `reset` and `set_mode` can
/// always cancel the driver that is in flight. `running` is simply "a driver
/// is live", which keeps at most one driver active at any time.
pub struct Timer<S: TickScheduler> {
    mode: PomodoroMode,
    remaining_seconds: u32,
    driver: Option<ActiveDriver<S::Handle>>,
    next_driver: DriverId,
    period: Duration,
    scheduler: S,
}

impl<S: TickScheduler> Timer<S> {
    pub fn new(scheduler: S) -> Self {
        let mode = PomodoroMode::default();
        Self {
            mode,
            remaining_seconds: mode.canonical_seconds(),
            driver: None,
            next_driver: DriverId::new(0),
            period: Duration::from_millis(TICK_INTERVAL_MS),
            scheduler,
        }
    }

    pub fn mode(&self) -> PomodoroMode {
        self.mode
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_some()
    }

    pub fn display(&self) -> String {
        format_time(self.remaining_seconds)
    }

    pub fn active_driver(&self) -> Option<DriverId> {
        self.driver.as_ref().map(|driver| driver.id)
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Starts the countdown. Returns `false` if it was already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        let id = self.next_driver;
        self.next_driver = id.next();
        let handle = self.scheduler.start(id, self.period);
        self.driver = Some(ActiveDriver { id, handle });
        tracing::debug!(
            driver = %id,
            mode = %self.mode,
            remaining = self.remaining_seconds,
            "timer started"
        );
        true
    }

    /// Stops the countdown, keeping the remaining time. Returns `false` if it
    /// was not running.
    pub fn pause(&mut self) -> bool {
        let paused = self.stop_driver();
        if paused {
            tracing::debug!(remaining = self.remaining_seconds, "timer paused");
        }
        paused
    }

    pub fn reset(&mut self) {
        self.stop_driver();
        self.remaining_seconds = self.mode.canonical_seconds();
    }

    /// Switches mode and resets; elapsed time in the old mode is discarded.
    pub fn set_mode(&mut self, mode: PomodoroMode) {
        self.mode = mode;
        self.reset();
    }

    pub fn tick(&mut self, driver: DriverId) -> TickOutcome {
        if self.active_driver() != Some(driver) {
            tracing::trace!(%driver, "ignoring tick from inactive driver");
            return TickOutcome::Stale;
        }

        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
            if self.remaining_seconds > 0 {
                return TickOutcome::TimeChanged {
                    remaining_seconds: self.remaining_seconds,
                };
            }
        }

        self.stop_driver();
        TickOutcome::TimeExpired { mode: self.mode }
    }

    fn stop_driver(&mut self) -> bool {
        match self.driver.take() {
            Some(driver) => {
                self.scheduler.cancel(driver.handle);
                true
            }
            None => false,
        }
    }
}

impl<S: TickScheduler> Drop for Timer<S> {
    fn drop(&mut self) {
        self.stop_driver();
    }
}
