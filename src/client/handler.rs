//! Client session handler
//!
//! Runs the per-client receive loop: reads message lines from one
//! connection and hands them to the broadcast engine. Owns cleanup when
//! the peer disconnects.

use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::broadcast;

use crate::broadcast::broadcast_message;
use crate::client::ClientRegistry;

/// Handles an admitted client's session.
///
/// - Uses BufReader to read message lines from the client.
/// - Hands each line to the broadcast engine with this client's address
///   as the origin.
/// - On EOF, read error, or shutdown, removes the client from the
///   registry; dropping the registry entry closes the write half.
pub async fn handle_client(
    mut reader: BufReader<OwnedReadHalf>,
    registry: Arc<ClientRegistry>,
    client_addr: SocketAddr,
    max_message_length: usize,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut line = String::new();

    loop {
        line.clear();
        tokio::select! {
            result = reader.read_line(&mut line) => match result {
                Ok(0) => {
                    // Client closed the connection
                    info!("Connection closed by client {}", client_addr);
                    break;
                }
                Ok(_) => {
                    if line.len() > max_message_length {
                        warn!(
                            "Truncating oversized message from {} ({} bytes)",
                            client_addr,
                            line.len()
                        );
                        truncate_utf8(&mut line, max_message_length);
                    }

                    let message = line.trim_end_matches(['\r', '\n']);
                    broadcast_message(&registry, client_addr, message).await;
                }
                Err(e) => {
                    warn!("Failed to read from {}: {}", client_addr, e);
                    break;
                }
            },
            _ = shutdown.recv() => {
                info!("Shutting down session for {}", client_addr);
                break;
            }
        }
    }

    registry.remove(client_addr).await;
    info!("Client {} disconnected", client_addr);
}

/// Truncates `s` to at most `max` bytes without splitting a UTF-8
/// character.
pub(crate) fn truncate_utf8(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }

    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
