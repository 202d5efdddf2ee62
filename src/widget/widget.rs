//! The UI-event boundary: one owned object holding the timer and the task
//! list, fed with typed actions and answering with render updates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pomodoro::{DriverId, PomodoroMode, TickOutcome, TickScheduler, Timer};
use crate::tasks::{Task, TaskId, TaskStore};

/// User actions sent by the widget front end.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Start,
    Pause,
    Reset,
    SetMode { mode: PomodoroMode },
    AddTask { text: String },
    RemoveTask { id: TaskId },
    ToggleTask { id: TaskId },
    /// Ask for the current state without changing anything.
    Refresh,
}

/// Everything a renderer needs to redraw the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub display: String,
    pub remaining_seconds: u32,
    pub mode: PomodoroMode,
    pub running: bool,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Update {
    State(Snapshot),
    TimeExpired { mode: PomodoroMode, message: String },
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("task text must not be empty")]
    EmptyTaskText,
}

pub fn expiry_message(mode: PomodoroMode) -> String {
    if mode.is_break() {
        "Break is over! Time to focus.".to_string()
    } else {
        "Focus session complete! Time for a break.".to_string()
    }
}

pub struct Widget<S: TickScheduler> {
    timer: Timer<S>,
    tasks: TaskStore,
}

impl<S: TickScheduler> Widget<S> {
    pub fn new(scheduler: S) -> Self {
        Self::with_tasks(scheduler, TaskStore::new())
    }

    pub fn with_tasks(scheduler: S, tasks: TaskStore) -> Self {
        Self {
            timer: Timer::new(scheduler),
            tasks,
        }
    }

    pub fn timer(&self) -> &Timer<S> {
        &self.timer
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            display: self.timer.display(),
            remaining_seconds: self.timer.remaining_seconds(),
            mode: self.timer.mode(),
            running: self.timer.is_running(),
            tasks: self.tasks.tasks().to_vec(),
        }
    }

    pub fn apply(&mut self, action: Action) -> Result<Update, WidgetError> {
        match action {
            Action::Start => {
                if !self.timer.start() {
                    tracing::debug!("start ignored; timer already running");
                }
            }
            Action::Pause => {
                if !self.timer.pause() {
                    tracing::debug!("pause ignored; timer not running");
                }
            }
            Action::Reset => self.timer.reset(),
            Action::SetMode { mode } => {
                self.timer.set_mode(mode);
                tracing::info!("{} Switched to {} mode", mode.emoji(), mode);
            }
            Action::AddTask { text } => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(WidgetError::EmptyTaskText);
                }
                let id = self.tasks.add(text);
                tracing::debug!(%id, "task added");
            }
            Action::RemoveTask { id } => {
                if !self.tasks.remove(&id) {
                    tracing::debug!(%id, "remove ignored; no such task");
                }
            }
            Action::ToggleTask { id } => {
                if self.tasks.toggle(&id).is_none() {
                    tracing::debug!(%id, "toggle ignored; no such task");
                }
            }
            Action::Refresh => {}
        }
        Ok(Update::State(self.snapshot()))
    }

    pub fn on_tick(&mut self, driver: DriverId) -> Vec<Update> {
        match self.timer.tick(driver) {
            TickOutcome::Stale => Vec::new(),
            TickOutcome::TimeChanged { .. } => vec![Update::State(self.snapshot())],
            TickOutcome::TimeExpired { mode } => {
                tracing::info!(mode = %mode, "countdown finished");
                vec![
                    Update::State(self.snapshot()),
                    Update::TimeExpired {
                        mode,
                        message: expiry_message(mode),
                    },
                ]
            }
        }
    }
}
