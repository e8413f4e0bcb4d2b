//! Terminal client wiring.

use std::sync::Arc;

use palaver_shared::time::SystemClock;
use tokio::sync::mpsc;

use crate::{
    config::ClientConfig,
    error::ClientError,
    session::{ChatClient, InputEvent},
    terminal::{TerminalView, spawn_input_thread},
    transport::WebSocketTransport,
};

/// Run the terminal chat client until the user quits.
///
/// # Arguments
///
/// * `config` - Endpoint and reconnect policy
/// * `username` - Optional initial value for the username field
pub async fn run_client(config: ClientConfig, username: Option<String>) -> Result<(), ClientError> {
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    if let Some(name) = username {
        let _ = input_tx.send(InputEvent::UsernameChanged(name));
    }

    println!(
        "\nChatting on {}. Set your name with /name <name>, type /quit or press Ctrl+C to exit.\n",
        config.endpoint
    );

    let _input_thread = spawn_input_thread(input_tx)?;

    let client = ChatClient::new(
        config,
        Arc::new(WebSocketTransport),
        Arc::new(SystemClock),
        TerminalView::new(),
    );
    client.run(input_rx).await;

    tracing::info!("Client session ended normally");
    Ok(())
}
