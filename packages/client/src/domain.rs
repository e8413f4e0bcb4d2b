//! Connection lifecycle as a two-state machine.
//!
//! This module contains pure functions that decide what a transport event
//! means for the client, without touching the transport or the view. The
//! session applies the returned effects.

use crate::message::{DisplayEntry, decode_frame};

/// Whether the client currently has an open transport connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

/// Events reported by a transport connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is open
    Open,
    /// A text frame arrived
    Frame(String),
    /// The transport reported a failure; a `Close` is expected to follow
    Error(String),
    /// The connection is gone
    Close,
}

/// Status display: a label plus the "connected" style flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusIndicator {
    pub label: &'static str,
    pub connected: bool,
}

impl StatusIndicator {
    pub const CONNECTED: Self = Self {
        label: "Connected",
        connected: true,
    };
    pub const CONNECTION_ERROR: Self = Self {
        label: "Connection error",
        connected: false,
    };
    pub const DISCONNECTED: Self = Self {
        label: "Disconnected",
        connected: false,
    };
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SetStatus(StatusIndicator),
    Render(DisplayEntry),
    /// Inbound frame was not JSON and is dropped
    DiscardFrame { reason: String },
    LogTransportError(String),
    /// Re-evaluate whether the input controls should be enabled
    RefreshControls,
    DisableControls,
    ScheduleReconnect,
}

/// Result of applying one transport event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: ConnectionState,
    pub effects: Vec<Effect>,
}

/// Compute the next state and effects for a transport event.
///
/// # Arguments
///
/// * `state` - The current connection state
/// * `event` - The event reported by the current connection
///
/// # Returns
///
/// The next state and the effects the session must apply, in order
pub fn transition(state: ConnectionState, event: &TransportEvent) -> Transition {
    match event {
        TransportEvent::Open => Transition {
            next: ConnectionState::Connected,
            effects: vec![
                Effect::SetStatus(StatusIndicator::CONNECTED),
                Effect::RefreshControls,
            ],
        },
        TransportEvent::Frame(payload) => {
            let effect = match decode_frame(payload) {
                Ok(entry) => Effect::Render(entry),
                Err(e) => Effect::DiscardFrame {
                    reason: e.to_string(),
                },
            };
            Transition {
                next: state,
                effects: vec![effect],
            }
        }
        TransportEvent::Error(reason) => Transition {
            next: ConnectionState::Disconnected,
            effects: vec![
                Effect::LogTransportError(reason.clone()),
                Effect::SetStatus(StatusIndicator::CONNECTION_ERROR),
            ],
        },
        TransportEvent::Close => Transition {
            next: ConnectionState::Disconnected,
            effects: vec![
                Effect::SetStatus(StatusIndicator::DISCONNECTED),
                Effect::DisableControls,
                Effect::ScheduleReconnect,
            ],
        },
    }
}

/// Check if the message input and send control should accept input.
pub fn controls_enabled(state: ConnectionState, username: &str) -> bool {
    state == ConnectionState::Connected && !username.is_empty()
}
