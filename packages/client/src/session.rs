//! Chat session: one connection, the input fields, and the reconnect loop.
//!
//! All session state lives in [`ChatClient`] and is only touched from the
//! task that runs it. Transport drivers and the reconnect timer talk back to
//! it over a single event channel, so events are handled one at a time in
//! arrival order.

use std::{ops::ControlFlow, sync::Arc};

use palaver_shared::time::Clock;
use tokio::sync::mpsc;

use crate::{
    config::ClientConfig,
    domain::{
        ConnectionState, Effect, StatusIndicator, Transition, TransportEvent, controls_enabled,
        transition,
    },
    message::{ChatMessage, DisplayEntry},
    retry::ReconnectTimer,
    transport::{ConnectionHandle, ConnectionId, EventSender, Transport},
    view::ChatView,
};

/// Events delivered to the session from its transport drivers and timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Transport {
        connection: ConnectionId,
        event: TransportEvent,
    },
    /// The reconnect timer armed after `connection` closed has fired
    ReconnectDue { connection: ConnectionId },
}

/// Events produced by the host's input widgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The username field changed
    UsernameChanged(String),
    /// The message field changed
    MessageChanged(String),
    /// Enter pressed in the message field, or the send control activated
    Submit,
    /// The host is shutting down
    Quit,
}

/// A chat session bound to one endpoint
pub struct ChatClient<V: ChatView> {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    view: V,
    state: ConnectionState,
    username: String,
    message_input: String,
    connection: Option<ConnectionHandle>,
    last_connection_id: ConnectionId,
    reconnect_attempts: u32,
    reconnect_timer: ReconnectTimer,
    running: bool,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl<V: ChatView> ChatClient<V> {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        view: V,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            config,
            transport,
            clock,
            view,
            state: ConnectionState::Disconnected,
            username: String::new(),
            message_input: String::new(),
            connection: None,
            last_connection_id: 0,
            reconnect_attempts: 0,
            reconnect_timer: ReconnectTimer::new(),
            running: false,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn message_input(&self) -> &str {
        &self.message_input
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Id of the current connection, if one has been started
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.connection.as_ref().map(ConnectionHandle::id)
    }

    pub fn is_reconnect_pending(&self) -> bool {
        self.reconnect_timer.is_pending()
    }

    /// Begin the session with the first connection attempt.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.reconnect_attempts = 0;
        self.view.set_status(StatusIndicator::DISCONNECTED);
        self.view.set_controls_enabled(false);
        self.connect();
    }

    /// End the session: cancel any pending reconnect and drop the connection.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.reconnect_timer.cancel();
        self.connection = None;
        self.state = ConnectionState::Disconnected;
        self.view.set_status(StatusIndicator::DISCONNECTED);
        self.view.set_controls_enabled(false);
        tracing::info!("Chat session stopped");
    }

    /// Open a new connection to the configured endpoint, replacing the
    /// current one.
    pub fn connect(&mut self) {
        self.last_connection_id += 1;
        let id = self.last_connection_id;
        tracing::info!("Connecting to {} (connection {})", self.config.endpoint, id);

        let events = EventSender::new(id, self.events_tx.clone());
        // The old handle is dropped here, which stops its driver
        self.connection = Some(ConnectionHandle::spawn(
            Arc::clone(&self.transport),
            self.config.endpoint.clone(),
            events,
        ));
    }

    /// Apply one event from a transport driver or the reconnect timer.
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Transport { connection, event } => {
                self.handle_transport_event(connection, event);
            }
            SessionEvent::ReconnectDue { connection } => {
                if self.running && self.connection_id() == Some(connection) {
                    self.connect();
                } else {
                    tracing::debug!("Ignoring reconnect armed by connection {}", connection);
                }
            }
        }
    }

    /// Wait for the next transport or timer event and apply it.
    pub async fn process_next_event(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply one event from the host's input widgets.
    pub fn handle_input(&mut self, input: InputEvent) -> ControlFlow<()> {
        match input {
            InputEvent::UsernameChanged(raw) => self.set_username(&raw),
            InputEvent::MessageChanged(raw) => self.set_message_input(&raw),
            InputEvent::Submit => {
                self.send_message();
            }
            InputEvent::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Trim and store the username, then re-evaluate the message controls.
    pub fn set_username(&mut self, raw: &str) {
        self.username = raw.trim().to_string();
        tracing::debug!("Username set to '{}'", self.username);
        self.refresh_controls();
    }

    pub fn set_message_input(&mut self, raw: &str) {
        self.message_input = raw.to_string();
    }

    /// Append an entry to the message list.
    ///
    /// Used for inbound frames and for the local echo of sent messages.
    pub fn display_message(&mut self, entry: &DisplayEntry) {
        self.view.append_entry(entry);
    }

    /// Send the message input as a chat message.
    ///
    /// Returns `true` when a frame was handed to the transport. Nothing
    /// happens, and the input is kept, when the trimmed text is empty, no
    /// username is set, or there is no open connection.
    pub fn send_message(&mut self) -> bool {
        let text = self.message_input.trim().to_string();
        if text.is_empty() || self.username.is_empty() {
            return false;
        }
        if self.state != ConnectionState::Connected {
            tracing::warn!("Not connected; message kept in the input");
            return false;
        }
        let Some(connection) = self.connection.as_ref() else {
            return false;
        };

        let message = ChatMessage::new(self.username.clone(), text, self.clock.now_epoch_secs());
        let frame = match message.to_json() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to serialize message: {}", e);
                return false;
            }
        };
        if let Err(e) = connection.send(frame) {
            tracing::warn!("Failed to send message: {}", e);
        }

        // Local echo, not confirmed by the server
        self.display_message(&DisplayEntry::from(&message));
        self.message_input.clear();
        self.view.clear_message_input();
        true
    }

    /// Run the session until the host's input closes or asks to quit.
    pub async fn run(mut self, mut inputs: mpsc::UnboundedReceiver<InputEvent>) {
        self.start();

        loop {
            tokio::select! {
                input = inputs.recv() => match input {
                    Some(input) => {
                        if self.handle_input(input).is_break() {
                            break;
                        }
                    }
                    None => break,
                },
                Some(event) = self.events_rx.recv() => self.handle_event(event),
            }
        }

        let connection = self.connection.take();
        self.stop();
        if let Some(connection) = connection {
            connection.close().await;
        }
    }

    fn handle_transport_event(&mut self, connection: ConnectionId, event: TransportEvent) {
        if self.connection_id() != Some(connection) {
            tracing::debug!("Ignoring {:?} from stale connection {}", event, connection);
            return;
        }

        if event == TransportEvent::Open {
            tracing::info!("Connected to {}", self.config.endpoint);
            self.reconnect_attempts = 0;
        }

        let Transition { next, effects } = transition(self.state, &event);
        self.state = next;
        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::SetStatus(status) => self.view.set_status(status),
            Effect::Render(entry) => self.display_message(&entry),
            Effect::DiscardFrame { reason } => {
                tracing::warn!("Dropping inbound frame: {}", reason);
            }
            Effect::LogTransportError(reason) => {
                tracing::error!("WebSocket error: {}", reason);
            }
            Effect::RefreshControls => self.refresh_controls(),
            Effect::DisableControls => self.view.set_controls_enabled(false),
            Effect::ScheduleReconnect => self.schedule_reconnect(),
        }
    }

    fn refresh_controls(&mut self) {
        let enabled = controls_enabled(self.state, &self.username);
        self.view.set_controls_enabled(enabled);
    }

    fn schedule_reconnect(&mut self) {
        tracing::info!("Connection closed");
        if !self.running {
            return;
        }
        let Some(connection) = self.connection_id() else {
            return;
        };

        let Some(delay) = self.config.retry.next_delay(self.reconnect_attempts) else {
            tracing::error!(
                "Failed to reconnect after {} attempts. Giving up.",
                self.reconnect_attempts
            );
            return;
        };
        self.reconnect_attempts += 1;
        tracing::info!(
            "Reconnecting in {:?}... (attempt {})",
            delay,
            self.reconnect_attempts
        );

        let events_tx = self.events_tx.clone();
        self.reconnect_timer.schedule(delay, move || {
            let _ = events_tx.send(SessionEvent::ReconnectDue { connection });
        });
    }
}
