//! Message formatting utilities for terminal display.

use palaver_shared::time::epoch_secs_to_local_time;

use crate::{domain::StatusIndicator, message::DisplayEntry};

const UNKNOWN_USER: &str = "(unknown)";
const UNKNOWN_TIME: &str = "--:--:--";
const RULE: &str = "------------------------------------------------------------";

/// Message formatter for terminal display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a chat entry: user line, text line and time-of-day line
    pub fn format_entry(entry: &DisplayEntry) -> String {
        format!(
            "\n{}\n@{}: {}\nsent at {}\n{}\n",
            RULE,
            entry.user.as_deref().unwrap_or(UNKNOWN_USER),
            entry.text.as_deref().unwrap_or_default(),
            Self::format_time_label(entry.timestamp),
            RULE
        )
    }

    /// Local time-of-day label for an optional epoch-seconds value
    pub fn format_time_label(timestamp: Option<i64>) -> String {
        timestamp
            .and_then(epoch_secs_to_local_time)
            .unwrap_or_else(|| UNKNOWN_TIME.to_string())
    }

    /// Format a status change
    pub fn format_status(status: StatusIndicator) -> String {
        let marker = if status.connected { "●" } else { "○" };
        format!("\n{} {}\n", marker, status.label)
    }

    /// Format the hint shown when the message controls change state
    pub fn format_controls(enabled: bool) -> String {
        if enabled {
            "Type a message and press Enter to send.\n".to_string()
        } else {
            "Sending is disabled until connected with a name (/name <your name>).\n".to_string()
        }
    }
}
