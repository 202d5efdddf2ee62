use futures_util::{Sink, SinkExt, Stream, StreamExt, stream};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, info, warn};

use crate::daemon::DaemonHandle;
use crate::error::Result;
use crate::widget::{Action, Update};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accepts widget connections on an already bound listener.
pub async fn serve(listener: TcpListener, daemon: DaemonHandle) -> Result<()> {
    info!(addr = %listener.local_addr()?, "WebSocket server listening");

    let incoming = stream::unfold(listener, |listener| async move {
        let accepted = listener.accept().await;
        Some((accepted, listener))
    });
    serve_incoming(incoming, daemon).await;

    Ok(())
}

/// Serves every accepted connection from `incoming` until the stream ends.
///
/// Accept errors (fd exhaustion, aborted handshakes) are logged and retried
/// after a short pause; they never stop the server.
pub async fn serve_incoming<S>(incoming: S, daemon: DaemonHandle)
where
    S: Stream<Item = io::Result<(TcpStream, SocketAddr)>>,
{
    futures_util::pin_mut!(incoming);

    while let Some(accepted) = incoming.next().await {
        match accepted {
            Ok((stream, peer_addr)) => {
                debug!(%peer_addr, "new WebSocket connection");
                tokio::spawn(handle_connection(stream, peer_addr, daemon.clone()));
            }
            Err(e) => {
                warn!(error = %e, "accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, daemon: DaemonHandle) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%peer_addr, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    info!(%peer_addr, "widget connected");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // New clients start from the current state; nobody else hears about it.
    let mut updates = match daemon.attach().await {
        Ok((snapshot, updates)) => {
            if let Err(e) = send_update(&mut ws_sender, &Update::State(snapshot)).await {
                warn!(%peer_addr, error = %e, "failed to send initial state");
                return;
            }
            updates
        }
        Err(e) => {
            warn!(%peer_addr, error = %e, "could not fetch initial state");
            return;
        }
    };

    loop {
        tokio::select! {
            msg = ws_receiver.next() => {
                let Some(msg) = msg else { break };
                match msg {
                    Ok(Message::Text(text)) => {
                        let reply = match serde_json::from_str::<Action>(&text) {
                            Ok(action) => match daemon.submit(action).await {
                                Ok(Ok(())) => None,
                                Ok(Err(rejected)) => Some(Update::Rejected {
                                    reason: rejected.to_string(),
                                }),
                                Err(e) => {
                                    warn!(%peer_addr, error = %e, "dropping connection");
                                    break;
                                }
                            },
                            Err(e) => {
                                warn!(%peer_addr, error = %e, "failed to parse action");
                                Some(Update::Rejected {
                                    reason: format!("parse error: {e}"),
                                })
                            }
                        };

                        if let Some(update) = reply {
                            if let Err(e) = send_update(&mut ws_sender, &update).await {
                                warn!(%peer_addr, error = %e, "failed to send reply");
                                break;
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!(%peer_addr, "connection closed by client");
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        if let Err(e) = ws_sender.send(Message::Pong(data)).await {
                            warn!(%peer_addr, error = %e, "failed to send pong");
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(%peer_addr, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
            update = updates.recv() => match update {
                Ok(update) => {
                    if let Err(e) = send_update(&mut ws_sender, &update).await {
                        warn!(%peer_addr, error = %e, "failed to push update");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%peer_addr, skipped, "client fell behind; skipping stale updates");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!(%peer_addr, "widget disconnected");
}

async fn send_update<S>(sink: &mut S, update: &Update) -> Result<()>
where
    S: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let json = serde_json::to_string(update)?;
    sink.send(Message::Text(json)).await?;
    Ok(())
}
