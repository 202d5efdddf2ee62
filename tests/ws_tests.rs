use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, Stream, StreamExt, stream};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use focus_it::notify::LogNotifier;
use focus_it::{Daemon, ws};

async fn start_server() -> SocketAddr {
    let (daemon, handle) = Daemon::new(Arc::new(LogNotifier));
    tokio::spawn(daemon.run());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(ws::serve(listener, handle));
    addr
}

async fn next_message<S>(ws: &mut S) -> Message
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for message")
        .expect("connection closed")
        .expect("websocket error")
}

async fn next_json<S>(ws: &mut S) -> Value
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    loop {
        if let Message::Text(text) = next_message(ws).await {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

fn text(json: &str) -> Message {
    Message::Text(json.to_string())
}

#[tokio::test]
async fn test_client_receives_initial_state() {
    let addr = start_server().await;
    let (mut ws, _) = connect_async(format!("ws://{addr}")).await.unwrap();

    let state = next_json(&mut ws).await;
    assert_eq!(state["type"], "state");
    assert_eq!(state["display"], "25:00");
    assert_eq!(state["mode"], "focus");
    assert_eq!(state["running"], false);
    assert_eq!(state["tasks"], Value::Array(Vec::new()));
}

#[tokio::test]
async fn test_add_task_and_rejections() {
    let addr = start_server().await;
    let (mut ws, _) = connect_async(format!("ws://{addr}")).await.unwrap();
    next_json(&mut ws).await;

    ws.send(text(r#"{"type":"add_task","text":"buy milk"}"#))
        .await
        .unwrap();
    let state = next_json(&mut ws).await;
    assert_eq!(state["type"], "state");
    assert_eq!(state["tasks"][0]["text"], "buy milk");
    assert_eq!(state["tasks"][0]["completed"], false);

    ws.send(text(r#"{"type":"add_task","text":"   "}"#))
        .await
        .unwrap();
    let rejected = next_json(&mut ws).await;
    assert_eq!(rejected["type"], "rejected");
    assert_eq!(rejected["reason"], "task text must not be empty");

    ws.send(text("not json")).await.unwrap();
    let rejected = next_json(&mut ws).await;
    assert_eq!(rejected["type"], "rejected");
    assert!(
        rejected["reason"]
            .as_str()
            .unwrap()
            .starts_with("parse error")
    );
}

#[tokio::test]
async fn test_toggle_round_trip_by_id() {
    let addr = start_server().await;
    let (mut ws, _) = connect_async(format!("ws://{addr}")).await.unwrap();
    next_json(&mut ws).await;

    ws.send(text(r#"{"type":"add_task","text":"call mom"}"#))
        .await
        .unwrap();
    let state = next_json(&mut ws).await;
    let id = state["tasks"][0]["id"].as_str().unwrap().to_string();

    let toggle = serde_json::json!({ "type": "toggle_task", "id": id }).to_string();
    ws.send(Message::Text(toggle)).await.unwrap();
    let state = next_json(&mut ws).await;
    assert_eq!(state["tasks"][0]["completed"], true);

    let remove = serde_json::json!({ "type": "remove_task", "id": id }).to_string();
    ws.send(Message::Text(remove)).await.unwrap();
    let state = next_json(&mut ws).await;
    assert_eq!(state["tasks"], Value::Array(Vec::new()));
}

#[tokio::test]
async fn test_changes_reach_other_clients() {
    let addr = start_server().await;
    let (mut first, _) = connect_async(format!("ws://{addr}")).await.unwrap();
    next_json(&mut first).await;
    let (mut second, _) = connect_async(format!("ws://{addr}")).await.unwrap();
    next_json(&mut second).await;

    first
        .send(text(r#"{"type":"set_mode","mode":"long_break"}"#))
        .await
        .unwrap();

    let state = next_json(&mut second).await;
    assert_eq!(state["mode"], "long_break");
    assert_eq!(state["display"], "15:00");
    assert_eq!(state["running"], false);
}

#[tokio::test]
async fn test_new_client_does_not_disturb_others() {
    let addr = start_server().await;
    let (mut first, _) = connect_async(format!("ws://{addr}")).await.unwrap();
    next_json(&mut first).await;
    let (mut second, _) = connect_async(format!("ws://{addr}")).await.unwrap();
    next_json(&mut second).await;

    second
        .send(text(r#"{"type":"set_mode","mode":"short_break"}"#))
        .await
        .unwrap();

    // The first update the earlier client sees is the mode change, not a
    // re-send of the state the newcomer was given.
    let state = next_json(&mut first).await;
    assert_eq!(state["mode"], "short_break");
    assert_eq!(state["display"], "05:00");
}

#[tokio::test]
async fn test_server_keeps_accepting_after_accept_error() {
    let (daemon, handle) = Daemon::new(Arc::new(LogNotifier));
    tokio::spawn(daemon.run());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let failure = stream::once(async {
        Err::<(TcpStream, SocketAddr), _>(io::Error::other("too many open files"))
    });
    let accepted = stream::unfold(listener, |listener| async move {
        let accepted = listener.accept().await;
        Some((accepted, listener))
    });
    let server = tokio::spawn(ws::serve_incoming(failure.chain(accepted), handle));

    let (mut ws, _) = connect_async(format!("ws://{addr}")).await.unwrap();
    let state = next_json(&mut ws).await;
    assert_eq!(state["type"], "state");
    assert!(!server.is_finished());
}

#[tokio::test]
async fn test_ping_is_answered_with_pong() {
    let addr = start_server().await;
    let (mut ws, _) = connect_async(format!("ws://{addr}")).await.unwrap();
    next_json(&mut ws).await;

    ws.send(Message::Ping(b"still there?".to_vec()))
        .await
        .unwrap();

    loop {
        match next_message(&mut ws).await {
            Message::Pong(data) => {
                assert_eq!(data, b"still there?".to_vec());
                break;
            }
            Message::Text(text) => panic!("unexpected update: {text}"),
            _ => {}
        }
    }
}

#[tokio::test]
async fn test_close_frame_ends_connection() {
    let addr = start_server().await;
    let (mut ws, _) = connect_async(format!("ws://{addr}")).await.unwrap();
    next_json(&mut ws).await;

    ws.close(None).await.unwrap();

    let ended = timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                None | Some(Err(_)) => break,
                Some(Ok(Message::Close(_))) => {}
                Some(Ok(other)) => panic!("unexpected message after close: {other:?}"),
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "connection stayed open after close frame");
}
