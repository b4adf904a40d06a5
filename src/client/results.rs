//! Client result types
//!
//! Defines result structures returned by registry operations.

use crate::client::Client;

/// Result of an admission attempt.
///
/// `Full` is a defined rejection, not an error: the registry is left
/// unchanged and the client is handed back so the caller can notify the
/// peer and close the connection.
#[derive(Debug, Clone)]
pub enum AdmissionResult {
    /// Client stored in a free slot
    Admitted(Client),
    /// Every slot is occupied; nothing was stored
    Full(Client),
}
