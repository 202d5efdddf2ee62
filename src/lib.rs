//! Focus It: a pomodoro countdown plus a task list, served to a browser widget
//! over a local WebSocket.

pub mod config;
pub mod daemon;
pub mod error;
pub mod logging;
pub mod notify;
pub mod pomodoro;
pub mod tasks;
pub mod widget;
pub mod ws;

pub use daemon::{Daemon, DaemonHandle};
pub use error::{Error, Result};
pub use pomodoro::{PomodoroMode, Timer};
pub use tasks::{Task, TaskId, TaskStore};
pub use widget::{Action, Snapshot, Update, Widget, WidgetError};
