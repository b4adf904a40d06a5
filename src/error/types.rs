//! Error types
//!
//! Defines domain-specific error types for each module of the chat server.

use std::fmt;
use std::io;

/// Handshake errors
#[derive(Debug)]
pub enum HandshakeError {
    /// Peer closed the connection before sending a display name
    Disconnected,
    Io(io::Error),
}

impl fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeError::Disconnected => {
                write!(f, "Client disconnected before sending a display name")
            }
            HandshakeError::Io(e) => write!(f, "Failed to read display name: {}", e),
        }
    }
}

impl std::error::Error for HandshakeError {}

impl From<io::Error> for HandshakeError {
    fn from(error: io::Error) -> Self {
        HandshakeError::Io(error)
    }
}

/// General chat server error that encompasses all error types
#[derive(Debug)]
pub enum ChatServerError {
    Bind { addr: String, source: io::Error },
    Handshake(HandshakeError),
    IoError(io::Error),
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Bind { addr, source } => {
                write!(f, "Failed to bind to {}: {}", addr, source)
            }
            ChatServerError::Handshake(e) => write!(f, "Handshake error: {}", e),
            ChatServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ChatServerError {}

impl From<HandshakeError> for ChatServerError {
    fn from(error: HandshakeError) -> Self {
        ChatServerError::Handshake(error)
    }
}

impl From<io::Error> for ChatServerError {
    fn from(error: io::Error) -> Self {
        ChatServerError::IoError(error)
    }
}
