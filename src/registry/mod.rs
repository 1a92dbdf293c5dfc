//! Connection registry
//!
//! Single source of truth mapping client identifier to the open send handle
//! for that connection. Shared across session tasks and the liveness sweeper
//! behind an `Arc<Mutex<...>>`; every method is one atomic map operation.

use std::collections::HashMap;
use tokio::sync::mpsc;

use crate::protocol::ServerRecord;

/// Send handle for one connection. The session owns the receiving half and
/// pumps records to its socket; once that half is dropped, every send fails,
/// which is the signal to treat the connection as gone.
pub type ClientSender = mpsc::UnboundedSender<ServerRecord>;

/// Registry for tracking active connections
pub struct ConnectionRegistry {
    connections: HashMap<String, ClientSender>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Inserts or replaces the entry for `id` (last-connect-wins). A replaced
    /// handle is dropped without notification; its session finds out when it
    /// next checks ownership on exit.
    pub fn register(&mut self, id: String, handle: ClientSender) {
        self.connections.insert(id, handle);
    }

    /// Removes the entry for `id`. Idempotent: removing an absent identifier
    /// is a no-op, not an error.
    pub fn unregister(&mut self, id: &str) -> Option<ClientSender> {
        self.connections.remove(id)
    }

    /// Removes the entry for `id` only if it still holds `handle`. Used by a
    /// session's exit path so a superseded connection never evicts the one
    /// that replaced it.
    pub fn unregister_handle(&mut self, id: &str, handle: &ClientSender) -> bool {
        match self.connections.get(id) {
            Some(current) if current.same_channel(handle) => {
                self.connections.remove(id);
                true
            }
            _ => false,
        }
    }

    /// Returns a clone of the current send handle for `id`, if registered.
    pub fn lookup(&self, id: &str) -> Option<ClientSender> {
        self.connections.get(id).cloned()
    }

    /// Point-in-time list of all registered identifiers.
    pub fn snapshot(&self) -> Vec<String> {
        self.connections.keys().cloned().collect()
    }

    /// Identifiers paired with their send handles, for a broadcast pass.
    pub fn entries(&self) -> Vec<(String, ClientSender)> {
        self.connections
            .iter()
            .map(|(id, handle)| (id.clone(), handle.clone()))
            .collect()
    }

    /// Current connection count, exposed for readiness reporting.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
