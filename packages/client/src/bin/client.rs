//! Terminal WebSocket chat client.
//!
//! Connects to the chat server at a fixed address, renders incoming
//! messages and sends what you type. Reconnects every 3 seconds for as long
//! as the server is away.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin palaver -- --user Alice
//! cargo run --bin palaver -- -u Bob
//! ```

use clap::Parser;

use palaver_client::ClientConfig;
use palaver_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "palaver")]
#[command(about = "WebSocket chat client with automatic reconnection", long_about = None)]
struct Args {
    /// Display name (can also be set later with /name)
    #[arg(short = 'u', long)]
    user: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger("palaver_client", env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = palaver_client::run_client(ClientConfig::default(), args.user).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
