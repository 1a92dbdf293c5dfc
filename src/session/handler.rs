//! Session control loop.

use log::{debug, error, info};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::broadcast::{broadcast_presence, send_presence_to};
use crate::liveness::LivenessTracker;
use crate::protocol::{ClientRecord, MAX_RECORD_LENGTH, ServerRecord, parse_record};
use crate::registry::ConnectionRegistry;
use crate::router::route;

/// Runs one client session to completion.
///
/// Registers the connection (replacing any prior one for the same
/// identifier), announces presence, then reads records until EOF or a read
/// error. The exit path runs exactly once in all cases: deregister, drop the
/// liveness record, rebroadcast presence.
pub async fn handle_session(
    reader: BufReader<OwnedReadHalf>,
    write_half: OwnedWriteHalf,
    client_id: String,
    registry: Arc<Mutex<ConnectionRegistry>>,
    liveness: Arc<Mutex<LivenessTracker>>,
) {
    let (tx, rx) = mpsc::unbounded_channel();

    {
        let mut registry_guard = registry.lock().await;
        let mut liveness_guard = liveness.lock().await;
        registry_guard.register(client_id.clone(), tx.clone());
        liveness_guard.touch(&client_id);
        info!(
            "Client {} connected ({} online)",
            client_id,
            registry_guard.len()
        );
    }

    let writer = tokio::spawn(write_records(write_half, rx));
    broadcast_presence(&registry, &liveness).await;

    read_loop(reader, &client_id, &tx, &registry, &liveness).await;

    // Exit path. Skip the removal if a newer connection for the same
    // identifier has already taken over the registry entry.
    let (removed, online) = {
        let mut registry_guard = registry.lock().await;
        let mut liveness_guard = liveness.lock().await;
        let removed = if registry_guard.unregister_handle(&client_id, &tx) {
            liveness_guard.remove(&client_id);
            true
        } else {
            false
        };
        (removed, registry_guard.len())
    };
    drop(tx);

    if removed {
        broadcast_presence(&registry, &liveness).await;
    }
    info!("Client {} disconnected ({} online)", client_id, online);

    let _ = writer.await;
}

/// Reads records until the connection ends, dispatching each by kind.
///
/// A session only stays open while the registry still maps its identifier to
/// its own handle. Once that stops being true (liveness eviction, or takeover
/// by a newer connection), the next inbound record ends the loop instead of
/// being serviced, so an evicted connection cannot linger as a ghost that
/// answers pings and re-inserts liveness records for an unregistered id.
async fn read_loop(
    mut reader: BufReader<OwnedReadHalf>,
    client_id: &str,
    tx: &mpsc::UnboundedSender<ServerRecord>,
    registry: &Arc<Mutex<ConnectionRegistry>>,
    liveness: &Arc<Mutex<LivenessTracker>>,
) {
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                info!("Connection closed by client {}", client_id);
                return;
            }
            Ok(_) => {
                // Any inbound record counts as activity, well-formed or not,
                // but only while this session still owns its registry entry.
                let still_registered = {
                    let registry_guard = registry.lock().await;
                    let mut liveness_guard = liveness.lock().await;
                    match registry_guard.lookup(client_id) {
                        Some(current) if current.same_channel(tx) => {
                            liveness_guard.touch(client_id);
                            true
                        }
                        _ => false,
                    }
                };
                if !still_registered {
                    info!("Session for {} closed externally", client_id);
                    return;
                }

                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if line.len() > MAX_RECORD_LENGTH {
                    debug!("Dropping oversized record from {}", client_id);
                    continue;
                }

                match parse_record(trimmed) {
                    Ok(ClientRecord::Ping) => {
                        let _ = tx.send(ServerRecord::Pong);
                    }
                    Ok(ClientRecord::GetOnlineUsers) => {
                        send_presence_to(registry, liveness, client_id).await;
                    }
                    Ok(ClientRecord::Message { to, text }) => {
                        route(registry, liveness, client_id, &to, &text).await;
                    }
                    Ok(ClientRecord::Unknown) => {
                        debug!("Ignoring unrecognized record kind from {}", client_id);
                    }
                    Err(e) => {
                        debug!("Dropping malformed record from {}: {}", client_id, e);
                    }
                }
            }
            Err(e) => {
                error!("Failed to read from {}: {}", client_id, e);
                return;
            }
        }
    }
}

/// Pumps outbound records to the socket, one JSON line per record. Ends when
/// every sender is gone or the socket write fails; a failed write drops the
/// receiver, which makes later sends to this connection fail and marks it
/// disconnected for the rest of the server.
async fn write_records(mut write_half: OwnedWriteHalf, mut rx: UnboundedReceiver<ServerRecord>) {
    while let Some(record) = rx.recv().await {
        let mut payload = match serde_json::to_string(&record) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to serialize outbound record: {}", e);
                continue;
            }
        };
        payload.push('\n');

        if write_half.write_all(payload.as_bytes()).await.is_err() {
            break;
        }
    }
}
