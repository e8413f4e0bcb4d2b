//! The surface the chat session renders into.

use crate::{domain::StatusIndicator, message::DisplayEntry};

/// Host-side widgets driven by the session
///
/// Implementations own the status display, the append-only message list
/// and the message input controls. The username input lives on the host
/// side and reaches the session as an input event.
pub trait ChatView: Send {
    /// Update the status label and its "connected" style.
    fn set_status(&mut self, status: StatusIndicator);

    /// Append an entry to the message list and scroll it into view.
    fn append_entry(&mut self, entry: &DisplayEntry);

    /// Enable or disable the message input and the send control.
    fn set_controls_enabled(&mut self, enabled: bool);

    /// Empty the message input after a send.
    fn clear_message_input(&mut self);
}
