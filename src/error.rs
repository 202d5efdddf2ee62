use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("desktop notification failed: {0}")]
    Notification(String),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("daemon is no longer running")]
    DaemonStopped,
}

pub type Result<T> = std::result::Result<T, Error>;
