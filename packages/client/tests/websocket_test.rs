//! Integration tests for the chat client against a real WebSocket peer.
//!
//! Each test hosts a throwaway axum WebSocket endpoint on an ephemeral port
//! and runs a `ChatClient` with the tokio-tungstenite transport against it.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use palaver_client::{
    ChatClient, ClientConfig, InputEvent,
    domain::StatusIndicator,
    message::{ChatMessage, DisplayEntry},
    retry::RetryPolicy,
    transport::WebSocketTransport,
    view::ChatView,
};
use palaver_shared::time::{Clock, SystemClock};
use tokio::{net::TcpListener, sync::mpsc};

/// Commands the test sends to the server side of one connection
enum PeerCommand {
    Send(String),
    Close,
}

/// What the server side saw from the client
#[derive(Debug, PartialEq, Eq)]
enum PeerFrame {
    Text(String),
    Close,
}

/// Server side of one accepted connection
struct PeerConnection {
    received: mpsc::UnboundedReceiver<PeerFrame>,
    commands: mpsc::UnboundedSender<PeerCommand>,
}

impl PeerConnection {
    fn send(&self, frame: &str) {
        let _ = self.commands.send(PeerCommand::Send(frame.to_string()));
    }

    fn close(&self) {
        let _ = self.commands.send(PeerCommand::Close);
    }
}

#[derive(Clone)]
struct PeerState {
    accepted: mpsc::UnboundedSender<PeerConnection>,
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<PeerState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: PeerState) {
    let (received_tx, received) = mpsc::unbounded_channel();
    let (commands, mut commands_rx) = mpsc::unbounded_channel();
    if state
        .accepted
        .send(PeerConnection { received, commands })
        .is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let _ = received_tx.send(PeerFrame::Text(text.as_str().to_owned()));
                }
                Some(Ok(Message::Close(_))) => {
                    let _ = received_tx.send(PeerFrame::Close);
                    break;
                }
                Some(Ok(_)) => {}
                _ => break,
            },
            command = commands_rx.recv() => match command {
                Some(PeerCommand::Send(frame)) => {
                    if socket.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Some(PeerCommand::Close) | None => {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            },
        }
    }
}

/// Start the peer and return its URL plus the stream of accepted connections
async fn start_peer() -> (String, mpsc::UnboundedReceiver<PeerConnection>) {
    let (accepted, accepted_rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .with_state(PeerState { accepted });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("ws://{}/ws", addr), accepted_rx)
}

#[derive(Default)]
struct Snapshot {
    statuses: Vec<StatusIndicator>,
    entries: Vec<DisplayEntry>,
    controls_enabled: bool,
}

/// View whose contents stay readable while the client runs in its own task
#[derive(Clone, Default)]
struct SharedView(Arc<Mutex<Snapshot>>);

impl SharedView {
    fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> T {
        f(&self.0.lock().unwrap())
    }
}

impl ChatView for SharedView {
    fn set_status(&mut self, status: StatusIndicator) {
        self.0.lock().unwrap().statuses.push(status);
    }

    fn append_entry(&mut self, entry: &DisplayEntry) {
        self.0.lock().unwrap().entries.push(entry.clone());
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.0.lock().unwrap().controls_enabled = enabled;
    }

    fn clear_message_input(&mut self) {}
}

/// Poll `condition` until it holds or a few seconds pass
async fn wait_until(view: &SharedView, condition: impl Fn(&Snapshot) -> bool) -> bool {
    for _ in 0..100 {
        if view.read(&condition) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

fn spawn_client(
    url: String,
) -> (
    SharedView,
    mpsc::UnboundedSender<InputEvent>,
    tokio::task::JoinHandle<()>,
) {
    let view = SharedView::default();
    let config = ClientConfig {
        endpoint: url,
        retry: RetryPolicy::flat(Duration::from_millis(200)),
    };
    let client = ChatClient::new(
        config,
        Arc::new(WebSocketTransport),
        Arc::new(SystemClock),
        view.clone(),
    );
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let session = tokio::spawn(client.run(input_rx));
    (view, input_tx, session)
}

#[tokio::test]
async fn test_client_connects_and_sends_message() {
    // テスト項目: 接続後に入力したメッセージがサーバーに届き、ローカルにも表示される
    // given (前提条件):
    let (url, mut accepted) = start_peer().await;
    let (view, inputs, _session) = spawn_client(url);
    let mut peer = accepted.recv().await.unwrap();
    assert!(wait_until(&view, |s| s.statuses.last() == Some(&StatusIndicator::CONNECTED)).await);

    // when (操作):
    inputs
        .send(InputEvent::UsernameChanged("alice".to_string()))
        .unwrap();
    inputs
        .send(InputEvent::MessageChanged(" hello ".to_string()))
        .unwrap();
    inputs.send(InputEvent::Submit).unwrap();

    // then (期待する結果):
    let Some(PeerFrame::Text(frame)) = peer.received.recv().await else {
        panic!("expected a text frame");
    };
    let message: ChatMessage = serde_json::from_str(&frame).unwrap();
    assert_eq!(message.user, "alice");
    assert_eq!(message.text, "hello");
    assert!((SystemClock.now_epoch_secs() - message.timestamp).abs() <= 1);
    assert!(wait_until(&view, |s| s.entries.len() == 1).await);
    assert!(view.read(|s| s.controls_enabled));
}

#[tokio::test]
async fn test_client_renders_inbound_and_skips_invalid_frames() {
    // テスト項目: 受信したメッセージは表示され、JSON でないフレームは無視される
    // given (前提条件):
    let (url, mut accepted) = start_peer().await;
    let (view, _inputs, _session) = spawn_client(url);
    let peer = accepted.recv().await.unwrap();

    // when (操作):
    peer.send("not json");
    peer.send(r#"{"type":"message","user":"bob","text":"hi","timestamp":1700000000}"#);

    // then (期待する結果):
    assert!(wait_until(&view, |s| !s.entries.is_empty()).await);
    tokio::time::sleep(Duration::from_millis(100)).await;
    let entries = view.read(|s| s.entries.clone());
    assert_eq!(
        entries,
        vec![DisplayEntry {
            user: Some("bob".to_string()),
            text: Some("hi".to_string()),
            timestamp: Some(1_700_000_000),
        }]
    );
}

#[tokio::test]
async fn test_client_reconnects_after_server_close() {
    // テスト項目: サーバーが切断するとクライアントは入力を無効化し、再接続する
    // given (前提条件):
    let (url, mut accepted) = start_peer().await;
    let (view, inputs, _session) = spawn_client(url);
    inputs
        .send(InputEvent::UsernameChanged("carol".to_string()))
        .unwrap();
    let first = accepted.recv().await.unwrap();
    assert!(wait_until(&view, |s| s.controls_enabled).await);

    // when (操作):
    first.close();

    // then (期待する結果):
    assert!(
        wait_until(&view, |s| {
            s.statuses.contains(&StatusIndicator::DISCONNECTED) && !s.controls_enabled
        })
        .await
    );
    let second = tokio::time::timeout(Duration::from_secs(5), accepted.recv())
        .await
        .unwrap();
    assert!(second.is_some());
    assert!(wait_until(&view, |s| s.controls_enabled).await);
}

#[tokio::test]
async fn test_client_stops_on_quit() {
    // テスト項目: Quit 入力でセッションが終了し、クライアントから close フレームが送られる
    // given (前提条件):
    let (url, mut accepted) = start_peer().await;
    let (view, inputs, session) = spawn_client(url);
    let mut peer = accepted.recv().await.unwrap();
    assert!(wait_until(&view, |s| s.statuses.last() == Some(&StatusIndicator::CONNECTED)).await);

    // when (操作):
    inputs.send(InputEvent::Quit).unwrap();

    // then (期待する結果):
    assert!(session.await.is_ok());
    let closed = tokio::time::timeout(Duration::from_secs(5), peer.received.recv())
        .await
        .unwrap();
    assert_eq!(closed, Some(PeerFrame::Close));
}
