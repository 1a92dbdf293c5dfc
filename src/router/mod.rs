//! Message routing
//!
//! Forwards point-to-point messages between connected clients. Routing is
//! fire-and-forget: malformed or undeliverable messages are dropped silently
//! and the sender is never notified.

use log::debug;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::broadcast::broadcast_presence;
use crate::liveness::LivenessTracker;
use crate::protocol::ServerRecord;
use crate::registry::ConnectionRegistry;

/// Routes one message from `sender_id` to `to`.
///
/// Drops the message silently when the text is empty, the recipient is the
/// sender, or the recipient is not connected. A send failure on a registered
/// recipient is an implicit disconnect: the recipient is deregistered and a
/// presence rebroadcast is triggered.
pub async fn route(
    registry: &Arc<Mutex<ConnectionRegistry>>,
    liveness: &Arc<Mutex<LivenessTracker>>,
    sender_id: &str,
    to: &str,
    text: &str,
) {
    if text.is_empty() || to == sender_id {
        debug!("Dropping malformed message from {}", sender_id);
        return;
    }

    let handle = { registry.lock().await.lookup(to) };
    let handle = match handle {
        Some(handle) => handle,
        None => {
            debug!(
                "Recipient {} not connected, dropping message from {}",
                to, sender_id
            );
            return;
        }
    };

    let record = ServerRecord::Message {
        from: sender_id.to_string(),
        text: text.to_string(),
    };
    if handle.send(record).is_err() {
        debug!("Send to {} failed, treating as disconnect", to);
        {
            let mut registry_guard = registry.lock().await;
            let mut liveness_guard = liveness.lock().await;
            if registry_guard.unregister_handle(to, &handle) {
                liveness_guard.remove(to);
            }
        }
        broadcast_presence(registry, liveness).await;
    }
}
