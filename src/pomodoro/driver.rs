//! Tick drivers for the pomodoro timer.
//!
//! A driver is a repeating once-per-period callback. Each run of a driver is
//! tagged with a [`DriverId`] so the timer can tell a live driver's ticks from
//! ones that were already queued when it was cancelled.

use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Identity of one run of the tick driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverId(u64);

impl DriverId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "driver#{}", self.0)
    }
}

/// Starts and cancels repeating tick drivers on behalf of the timer.
pub trait TickScheduler {
    /// Whatever the scheduler needs to cancel a running driver later.
    type Handle;

    /// Begins delivering `driver` once every `period`. The first tick must
    /// arrive one full period after this call.
    fn start(&mut self, driver: DriverId, period: Duration) -> Self::Handle;

    fn cancel(&mut self, handle: Self::Handle);
}

pub type TickSender = mpsc::UnboundedSender<DriverId>;
pub type TickReceiver = mpsc::UnboundedReceiver<DriverId>;

pub fn create_tick_channel() -> (TickSender, TickReceiver) {
    mpsc::unbounded_channel()
}

/// Runs each driver as a tokio task that pushes its id into a channel.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioTickScheduler {
    ticks: TickSender,
}

impl TokioTickScheduler {
    pub fn new(ticks: TickSender) -> Self {
        Self { ticks }
    }
}

impl TickScheduler for TokioTickScheduler {
    type Handle = JoinHandle<()>;

    fn start(&mut self, driver: DriverId, period: Duration) -> Self::Handle {
        let ticks = self.ticks.clone();
        tokio::spawn(async move {
            // interval() would complete its first tick immediately
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if ticks.send(driver).is_err() {
                    tracing::debug!(%driver, "tick receiver closed; stopping driver");
                    break;
                }
            }
        })
    }

    fn cancel(&mut self, handle: Self::Handle) {
        handle.abort();
    }
}

/// Scheduler for callers that deliver ticks themselves, e.g. a render loop
/// or a test. It only keeps track of which drivers are live.
#[derive(Debug, Default)]
pub struct ManualTickScheduler {
    live: Vec<DriverId>,
    started: usize,
}

impl ManualTickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_drivers(&self) -> &[DriverId] {
        &self.live
    }

    /// Total number of drivers ever started.
    pub fn started(&self) -> usize {
        self.started
    }
}

impl TickScheduler for ManualTickScheduler {
    type Handle = DriverId;

    fn start(&mut self, driver: DriverId, _period: Duration) -> Self::Handle {
        self.live.push(driver);
        self.started += 1;
        driver
    }

    fn cancel(&mut self, handle: Self::Handle) {
        self.live.retain(|driver| *driver != handle);
    }
}
