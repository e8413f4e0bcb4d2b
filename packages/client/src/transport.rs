//! Transport seam between the chat session and the network.
//!
//! A [`Transport`] drives exactly one connection: it reports `Open`,
//! `Frame`, `Error` and `Close` through an [`EventSender`] bound to that
//! connection's id, and writes whatever the session queues on the outbound
//! channel. A new connection always gets a new id and a new sender, so
//! events from a replaced connection can be told apart and ignored.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{domain::TransportEvent, error::TransportError, session::SessionEvent};

/// Identifies one connection attempt within a session
pub type ConnectionId = u64;

/// How long a dropped connection's driver may take to close before it is aborted
pub const CLOSE_GRACE_PERIOD: Duration = Duration::from_millis(500);

/// Event reactions registered for a single connection
#[derive(Debug, Clone)]
pub struct EventSender {
    connection: ConnectionId,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSender {
    pub(crate) fn new(connection: ConnectionId, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { connection, tx }
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    /// Report an event to the session.
    ///
    /// Returns `false` when the session is gone.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.tx
            .send(SessionEvent::Transport {
                connection: self.connection,
                event,
            })
            .is_ok()
    }
}

/// A connection driver
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Open a connection to `endpoint` and drive it until it closes.
    ///
    /// A failed open must be reported as `Error` followed by `Close`. When
    /// `outbound` closes the session has dropped the connection; the driver
    /// should close it and return.
    async fn run(
        &self,
        endpoint: String,
        outbound: mpsc::UnboundedReceiver<String>,
        events: EventSender,
    );
}

/// The live connection owned by the session.
///
/// Dropping the handle closes the outbound queue so the driver can close
/// the connection itself; a driver still running after
/// [`CLOSE_GRACE_PERIOD`] is aborted.
#[derive(Debug)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: Option<mpsc::UnboundedSender<String>>,
    task: JoinHandle<()>,
}

impl ConnectionHandle {
    /// Spawn the transport driver for a new connection.
    pub fn spawn(transport: Arc<dyn Transport>, endpoint: String, events: EventSender) -> Self {
        let id = events.connection();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            transport.run(endpoint, outbound_rx, events).await;
        });
        Self {
            id,
            outbound: Some(outbound),
            task,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a text frame. Does not wait for the write.
    pub fn send(&self, frame: String) -> Result<(), TransportError> {
        self.outbound
            .as_ref()
            .ok_or_else(|| TransportError::Write("connection is closing".to_string()))?
            .send(frame)
            .map_err(|_| TransportError::Write("connection driver has stopped".to_string()))
    }

    /// Close the outbound queue and wait for the driver to close the
    /// connection, aborting it after [`CLOSE_GRACE_PERIOD`].
    pub async fn close(mut self) {
        self.outbound = None;
        if tokio::time::timeout(CLOSE_GRACE_PERIOD, &mut self.task)
            .await
            .is_err()
        {
            tracing::debug!("Connection {} did not close in time", self.id);
            self.task.abort();
        }
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        // `outbound` is dropped right after this, which the driver observes
        let driver = self.task.abort_handle();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    tokio::time::sleep(CLOSE_GRACE_PERIOD).await;
                    driver.abort();
                });
            }
            Err(_) => driver.abort(),
        }
    }
}

/// WebSocket transport built on tokio-tungstenite
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

#[async_trait]
impl Transport for WebSocketTransport {
    async fn run(
        &self,
        endpoint: String,
        mut outbound: mpsc::UnboundedReceiver<String>,
        events: EventSender,
    ) {
        let ws_stream = match connect_async(endpoint.as_str()).await {
            Ok((stream, _response)) => stream,
            Err(e) => {
                let error = TransportError::Connect {
                    endpoint,
                    reason: e.to_string(),
                };
                events.emit(TransportEvent::Error(error.to_string()));
                events.emit(TransportEvent::Close);
                return;
            }
        };

        tracing::debug!("Connection {} open to {}", events.connection(), endpoint);
        events.emit(TransportEvent::Open);

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                outgoing = outbound.recv() => match outgoing {
                    Some(frame) => {
                        if let Err(e) = write.send(Message::Text(frame.into())).await {
                            let error = TransportError::Write(e.to_string());
                            events.emit(TransportEvent::Error(error.to_string()));
                            break;
                        }
                    }
                    None => {
                        // Session dropped this connection
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                },
                incoming = read.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        events.emit(TransportEvent::Frame(text.as_str().to_owned()));
                    }
                    Some(Ok(Message::Binary(data))) => {
                        tracing::debug!("Ignoring {} bytes of binary data", data.len());
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!("Server closed the connection: {:?}", frame);
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        let error = TransportError::Read(e.to_string());
                        events.emit(TransportEvent::Error(error.to_string()));
                        break;
                    }
                    None => break,
                },
            }
        }

        events.emit(TransportEvent::Close);
    }
}
