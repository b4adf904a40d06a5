//! Broadcast engine
//!
//! Fans one client's message out to every other registered client.

use log::{info, warn};
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;

use crate::client::ClientRegistry;

/// Sender name used when the origin is no longer registered.
const UNKNOWN_SENDER: &str = "unknown";

/// Delivers `message` from `origin` to every registered client except the
/// origin itself.
///
/// Works from a point-in-time registry snapshot so the registry lock is
/// not held across network writes. A failed write to one recipient is
/// logged and skipped; that recipient's own handler notices the broken
/// stream and removes it. The origin may have disconnected between read
/// and fan-out, in which case its name resolves to a fallback.
pub async fn broadcast_message(registry: &ClientRegistry, origin: SocketAddr, message: &str) {
    let snapshot = registry.snapshot().await;

    let sender_name = snapshot
        .iter()
        .find(|client| client.addr() == origin)
        .map(|client| client.display_name().to_string())
        .unwrap_or_else(|| UNKNOWN_SENDER.to_string());

    let full_message = format!("{}: {}\n", sender_name, message);
    info!("{}: {}", sender_name, message);

    for client in &snapshot {
        if client.addr() == origin {
            continue;
        }

        let writer = client.writer();
        let mut writer = writer.lock().await;
        if let Err(e) = writer.write_all(full_message.as_bytes()).await {
            warn!("Failed to deliver to {}: {}", client.addr(), e);
        }
    }
}
