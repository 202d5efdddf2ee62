use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8765";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "focus_it",
    version,
    about = "Pomodoro timer and task list daemon for the Focus It browser widget"
)]
pub struct Cli {
    /// Address the widget WebSocket endpoint listens on
    #[arg(long, value_name = "ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: SocketAddr,

    /// Shorthand for `--log-level debug`
    #[arg(short, long)]
    pub verbose: bool,

    /// Tracing filter directive, e.g. `info` or `focus_it=debug`
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log file path (defaults to ~/.local/share/focus_it/daemon.log)
    #[arg(short = 'l', long = "log", value_name = "PATH", conflicts_with = "no_log_file")]
    pub log_file: Option<PathBuf>,

    /// Only log to stderr
    #[arg(long = "no-log-file")]
    pub no_log_file: bool,

    /// Log countdown expiry instead of showing a desktop notification
    #[arg(long = "no-notify")]
    pub no_notify: bool,
}

impl Cli {
    pub fn effective_log_level(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            self.log_level.as_str()
        }
    }

    pub fn log_file_path(&self) -> Option<PathBuf> {
        if self.no_log_file {
            return None;
        }
        Some(self.log_file.clone().unwrap_or_else(default_log_file))
    }
}

pub fn default_log_file() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".local/share/focus_it/daemon.log")
}
