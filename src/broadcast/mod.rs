//! Presence broadcasting
//!
//! Computes the online-users view per connection and pushes it out. A
//! recipient never sees its own identifier in the list it receives.

use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::liveness::LivenessTracker;
use crate::protocol::ServerRecord;
use crate::registry::{ClientSender, ConnectionRegistry};

/// Sends a presence snapshot to every registered connection.
///
/// The snapshot is taken once before any send; a recipient that fails mid-pass
/// is deregistered afterwards but may still appear in the views delivered
/// during this same pass (exclusion is based on the pre-pass snapshot).
pub async fn broadcast_presence(
    registry: &Arc<Mutex<ConnectionRegistry>>,
    liveness: &Arc<Mutex<LivenessTracker>>,
) {
    let entries = { registry.lock().await.entries() };
    let ids: Vec<String> = entries.iter().map(|(id, _)| id.clone()).collect();

    let mut failed: Vec<(String, ClientSender)> = Vec::new();
    for (id, handle) in &entries {
        let users: Vec<String> = ids.iter().filter(|u| *u != id).cloned().collect();
        if handle.send(ServerRecord::OnlineUsers { users }).is_err() {
            failed.push((id.clone(), handle.clone()));
        }
    }

    if failed.is_empty() {
        return;
    }

    warn!(
        "Presence broadcast failed for {} connection(s), deregistering",
        failed.len()
    );
    let mut registry_guard = registry.lock().await;
    let mut liveness_guard = liveness.lock().await;
    for (id, handle) in &failed {
        if registry_guard.unregister_handle(id, handle) {
            liveness_guard.remove(id);
        }
    }
}

/// Sends the presence snapshot to one connection, for explicit queries.
pub async fn send_presence_to(
    registry: &Arc<Mutex<ConnectionRegistry>>,
    liveness: &Arc<Mutex<LivenessTracker>>,
    id: &str,
) {
    let (handle, users) = {
        let registry_guard = registry.lock().await;
        let handle = match registry_guard.lookup(id) {
            Some(handle) => handle,
            None => return,
        };
        let users: Vec<String> = registry_guard
            .snapshot()
            .into_iter()
            .filter(|u| u != id)
            .collect();
        (handle, users)
    };

    if handle.send(ServerRecord::OnlineUsers { users }).is_err() {
        debug!("Presence reply to {} failed, deregistering", id);
        {
            let mut registry_guard = registry.lock().await;
            let mut liveness_guard = liveness.lock().await;
            if registry_guard.unregister_handle(id, &handle) {
                liveness_guard.remove(id);
            }
        }
        broadcast_presence(registry, liveness).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn shared() -> (Arc<Mutex<ConnectionRegistry>>, Arc<Mutex<LivenessTracker>>) {
        (
            Arc::new(Mutex::new(ConnectionRegistry::new())),
            Arc::new(Mutex::new(LivenessTracker::new())),
        )
    }

    async fn connect(
        registry: &Arc<Mutex<ConnectionRegistry>>,
        liveness: &Arc<Mutex<LivenessTracker>>,
        id: &str,
    ) -> UnboundedReceiver<ServerRecord> {
        let (tx, rx) = mpsc::unbounded_channel();
        registry.lock().await.register(id.to_string(), tx);
        liveness.lock().await.touch(id);
        rx
    }

    fn expect_users(record: ServerRecord) -> Vec<String> {
        match record {
            ServerRecord::OnlineUsers { mut users } => {
                users.sort();
                users
            }
            other => panic!("expected online_users, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_broadcast_excludes_recipient() {
        let (registry, liveness) = shared();
        let mut rx_a = connect(&registry, &liveness, "alice").await;
        let mut rx_b = connect(&registry, &liveness, "bob").await;

        broadcast_presence(&registry, &liveness).await;

        assert_eq!(expect_users(rx_a.try_recv().unwrap()), vec!["bob".to_string()]);
        assert_eq!(expect_users(rx_b.try_recv().unwrap()), vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn test_broadcast_to_sole_connection_is_empty_list() {
        let (registry, liveness) = shared();
        let mut rx = connect(&registry, &liveness, "alice").await;

        broadcast_presence(&registry, &liveness).await;

        assert!(expect_users(rx.try_recv().unwrap()).is_empty());
    }

    #[tokio::test]
    async fn test_failed_recipient_is_deregistered_without_aborting_pass() {
        let (registry, liveness) = shared();
        let mut rx_a = connect(&registry, &liveness, "alice").await;
        let rx_b = connect(&registry, &liveness, "bob").await;

        // Bob's session is gone: dropping the receiver makes sends fail.
        drop(rx_b);

        broadcast_presence(&registry, &liveness).await;

        // Alice still got her view (stale: bob was in the pre-pass snapshot).
        assert_eq!(expect_users(rx_a.try_recv().unwrap()), vec!["bob".to_string()]);
        assert_eq!(registry.lock().await.snapshot(), vec!["alice".to_string()]);
        assert!(!liveness.lock().await.contains("bob"));
    }

    #[tokio::test]
    async fn test_send_presence_to_single_recipient() {
        let (registry, liveness) = shared();
        let mut rx_a = connect(&registry, &liveness, "alice").await;
        let mut rx_b = connect(&registry, &liveness, "bob").await;

        send_presence_to(&registry, &liveness, "alice").await;

        assert_eq!(expect_users(rx_a.try_recv().unwrap()), vec!["bob".to_string()]);
        // Bob received nothing from a targeted reply.
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_presence_to_absent_id_is_noop() {
        let (registry, liveness) = shared();
        let mut rx = connect(&registry, &liveness, "alice").await;

        send_presence_to(&registry, &liveness, "nobody").await;

        assert!(rx.try_recv().is_err());
    }
}
