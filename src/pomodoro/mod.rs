pub mod driver;
pub mod pomodoro;
pub mod timer;

pub use driver::{
    DriverId, ManualTickScheduler, TickReceiver, TickScheduler, TickSender, TokioTickScheduler,
    create_tick_channel,
};
pub use pomodoro::{PomodoroMode, format_time};
pub use timer::{TickOutcome, Timer};
