use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use focus_it::config::Cli;
use focus_it::notify::{DesktopNotifier, ExpiryNotifier, LogNotifier};
use focus_it::pomodoro::pomodoro::{FOCUS_MINUTES, LONG_BREAK_MINUTES, SHORT_BREAK_MINUTES};
use focus_it::{Daemon, logging, ws};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_file = cli.log_file_path();
    let _log_guard = logging::init_tracing(cli.effective_log_level(), log_file.as_deref())
        .context("initialize logging")?;

    info!("🍅 Focus It - Pomodoro Timer & Task List");
    info!(
        "Pomodoro settings: {}min focus / {}min short break / {}min long break",
        FOCUS_MINUTES, SHORT_BREAK_MINUTES, LONG_BREAK_MINUTES
    );
    if let Some(ref path) = log_file {
        info!("Logging to: {}", path.display());
    }

    let notifier: Arc<dyn ExpiryNotifier> = if cli.no_notify {
        Arc::new(LogNotifier)
    } else {
        Arc::new(DesktopNotifier)
    };
    let (daemon, handle) = Daemon::new(notifier);

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("bind {}", cli.listen))?;
    info!("Widget endpoint: ws://{}", cli.listen);
    let server = tokio::spawn(ws::serve(listener, handle));

    tokio::select! {
        () = daemon.run() => info!("daemon loop finished"),
        joined = server => {
            joined
                .context("websocket server task failed")?
                .context("websocket server stopped")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("listen for ctrl-c")?;
            info!("received SIGINT; shutting down");
        }
    }

    Ok(())
}
