//! The daemon task: sole owner of the widget.
//!
//! Client requests and driver ticks arrive on channels and are applied one at
//! a time, so widget state is never touched concurrently. Every change is
//! broadcast to all subscribed clients.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::notify::ExpiryNotifier;
use crate::pomodoro::{
    DriverId, PomodoroMode, TickReceiver, TokioTickScheduler, create_tick_channel,
};
use crate::tasks::{Task, TaskStore};
use crate::widget::{Action, Snapshot, Update, Widget, WidgetError};

const UPDATE_BUFFER: usize = 64;

#[derive(Debug)]
pub enum Request {
    Apply {
        action: Action,
        reply: oneshot::Sender<std::result::Result<(), WidgetError>>,
    },
    /// Current state plus a subscription taken at the same point, so the
    /// caller sees every later update and nothing older.
    Attach {
        reply: oneshot::Sender<(Snapshot, broadcast::Receiver<Update>)>,
    },
}

/// Cheap, cloneable access to a running daemon.
#[derive(Debug, Clone)]
pub struct DaemonHandle {
    requests: mpsc::UnboundedSender<Request>,
    updates: broadcast::Sender<Update>,
}

impl DaemonHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<Update> {
        self.updates.subscribe()
    }

    /// Applies `action` and waits for the verdict. A successful action's new
    /// state reaches clients through [`DaemonHandle::subscribe`].
    pub async fn submit(&self, action: Action) -> Result<std::result::Result<(), WidgetError>> {
        let (reply, verdict) = oneshot::channel();
        self.requests
            .send(Request::Apply { action, reply })
            .map_err(|_| Error::DaemonStopped)?;
        verdict.await.map_err(|_| Error::DaemonStopped)
    }

    /// Returns the current state for a new client without publishing it to
    /// everyone else, along with that client's update subscription.
    pub async fn attach(&self) -> Result<(Snapshot, broadcast::Receiver<Update>)> {
        let (reply, attached) = oneshot::channel();
        self.requests
            .send(Request::Attach { reply })
            .map_err(|_| Error::DaemonStopped)?;
        attached.await.map_err(|_| Error::DaemonStopped)
    }
}

pub struct Daemon {
    widget: Widget<TokioTickScheduler>,
    ticks: TickReceiver,
    requests: mpsc::UnboundedReceiver<Request>,
    updates: broadcast::Sender<Update>,
    notifier: Arc<dyn ExpiryNotifier>,
}

impl Daemon {
    pub fn new(notifier: Arc<dyn ExpiryNotifier>) -> (Self, DaemonHandle) {
        let (tick_tx, ticks) = create_tick_channel();
        let (requests_tx, requests) = mpsc::unbounded_channel();
        let (updates, _) = broadcast::channel(UPDATE_BUFFER);

        let tasks = TaskStore::with_render_hook(|tasks: &[Task]| {
            let done = tasks.iter().filter(|task| task.is_completed()).count();
            debug!(total = tasks.len(), done, "task list changed");
        });

        let daemon = Self {
            widget: Widget::with_tasks(TokioTickScheduler::new(tick_tx), tasks),
            ticks,
            requests,
            updates: updates.clone(),
            notifier,
        };
        let handle = DaemonHandle {
            requests: requests_tx,
            updates,
        };
        (daemon, handle)
    }

    /// Runs until every [`DaemonHandle`] has been dropped.
    pub async fn run(mut self) {
        let snapshot = self.widget.snapshot();
        info!(
            started_at = %Local::now().format("%Y-%m-%d %H:%M:%S"),
            mode = %snapshot.mode,
            display = %snapshot.display,
            "=== Session started ==="
        );

        loop {
            tokio::select! {
                Some(driver) = self.ticks.recv() => self.handle_tick(driver),
                request = self.requests.recv() => match request {
                    Some(request) => self.handle_request(request),
                    None => break,
                },
            }
        }

        info!("all handles dropped; daemon stopping");
    }

    fn handle_request(&mut self, request: Request) {
        match request {
            Request::Apply { action, reply } => self.apply(action, reply),
            Request::Attach { reply } => {
                let attached = (self.widget.snapshot(), self.updates.subscribe());
                if reply.send(attached).is_err() {
                    debug!("client went away before attaching");
                }
            }
        }
    }

    fn apply(
        &mut self,
        action: Action,
        reply: oneshot::Sender<std::result::Result<(), WidgetError>>,
    ) {
        debug!(?action, "applying action");
        let verdict = match self.widget.apply(action) {
            Ok(update) => {
                self.publish(update);
                Ok(())
            }
            Err(err) => {
                debug!(error = %err, "action rejected");
                Err(err)
            }
        };
        if reply.send(verdict).is_err() {
            debug!("requester went away before the reply");
        }
    }

    fn handle_tick(&mut self, driver: DriverId) {
        for update in self.widget.on_tick(driver) {
            if let Update::TimeExpired { mode, message } = &update {
                self.notify(*mode, message.clone());
            }
            self.publish(update);
        }
    }

    fn publish(&self, update: Update) {
        if self.updates.send(update).is_err() {
            debug!("no clients connected; update dropped");
        }
    }

    fn notify(&self, mode: PomodoroMode, message: String) {
        let notifier = Arc::clone(&self.notifier);
        tokio::task::spawn_blocking(move || {
            if let Err(err) = notifier.time_expired(mode, &message) {
                warn!(error = %err, "failed to send notification");
            }
        });
    }
}
