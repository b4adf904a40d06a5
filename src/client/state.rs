//! Module `client`
//!
//! Defines the `Client` struct representing one admitted chat participant:
//! its display name, peer address, and shared write handle.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

/// Represents one admitted chat client.
///
/// The read half of the connection is owned exclusively by the client's
/// handler task; the registry entry holds the write half so the broadcast
/// engine can deliver messages from other clients.
#[derive(Debug, Clone)]
pub struct Client {
    display_name: String,
    addr: SocketAddr,
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl Client {
    pub fn new(display_name: String, addr: SocketAddr, writer: OwnedWriteHalf) -> Self {
        Self {
            display_name,
            addr,
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// Returns the display name declared at handshake.
    ///
    /// Immutable after admission.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the peer socket address identifying this connection.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns a shared handle to the write half of the connection.
    ///
    /// Writers lock this handle per delivery; the registry lock is never
    /// held while writing.
    pub fn writer(&self) -> Arc<Mutex<OwnedWriteHalf>> {
        Arc::clone(&self.writer)
    }
}
