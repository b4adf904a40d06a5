//! Client registry
//!
//! Fixed-capacity, mutex-guarded collection of admitted clients.
//!
//! The slot vector is owned by the registry and only reachable through the
//! atomic operations below. The lock is held for the duration of a single
//! operation and never across a network write; broadcast works from
//! snapshots instead.

use std::net::SocketAddr;
use tokio::sync::Mutex;

use crate::client::Client;
use crate::client::results::AdmissionResult;

/// Registry for tracking active clients.
///
/// Holds at most `capacity` clients, one per slot. A slot is occupied
/// strictly between successful admission and completed removal.
pub struct ClientRegistry {
    slots: Mutex<Vec<Option<Client>>>,
}

impl ClientRegistry {
    /// Creates a registry with `capacity` free slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new((0..capacity).map(|_| None).collect()),
        }
    }

    /// Admits a client into the first free slot.
    ///
    /// Returns `AdmissionResult::Full` without mutating state when every
    /// slot is occupied. Atomic with respect to concurrent admissions and
    /// removals; occupancy never exceeds capacity.
    pub async fn try_admit(&self, client: Client) -> AdmissionResult {
        let mut slots = self.slots.lock().await;

        for slot in slots.iter_mut() {
            if slot.is_none() {
                *slot = Some(client.clone());
                return AdmissionResult::Admitted(client);
            }
        }

        AdmissionResult::Full(client)
    }

    /// Clears the slot holding the client with this peer address.
    ///
    /// A no-op when no such slot exists, so redundant calls are safe.
    pub async fn remove(&self, addr: SocketAddr) {
        let mut slots = self.slots.lock().await;

        for slot in slots.iter_mut() {
            if slot.as_ref().map(|client| client.addr()) == Some(addr) {
                *slot = None;
                break;
            }
        }
    }

    /// Returns a point-in-time list of occupied slots, in slot order.
    pub async fn snapshot(&self) -> Vec<Client> {
        let slots = self.slots.lock().await;
        slots.iter().flatten().cloned().collect()
    }

    /// Returns the number of occupied slots.
    pub async fn len(&self) -> usize {
        let slots = self.slots.lock().await;
        slots.iter().flatten().count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
