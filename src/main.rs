//! RAX Chat Server - Entry Point
//!
//! A Rust-based TCP chat relay: clients announce a display name and every
//! message they send is broadcast to all other connected clients.

use env_logger;
use log::{error, info};

use rax_chat_server::Server;
use rax_chat_server::server::ServerConfig;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching chat server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            std::process::exit(1);
        }
    };

    server.start().await;
}
