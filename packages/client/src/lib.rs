//! Palaver: a minimal WebSocket chat client.
//!
//! One connection to a chat server, flat JSON messages, optimistic local
//! echo, and a flat-interval reconnect loop. The session core is host
//! agnostic; the `terminal` module provides a readline front end.

pub mod config;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod message;
pub mod retry;
pub mod session;
pub mod terminal;
pub mod transport;
pub mod view;

mod runner;

pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use runner::run_client;
pub use session::{ChatClient, InputEvent};
