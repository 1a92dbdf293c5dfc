use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::error::HandshakeError;
use crate::liveness::{LivenessTracker, spawn_sweeper};
use crate::protocol::MAX_RECORD_LENGTH;
use crate::registry::ConnectionRegistry;
use crate::server::config::RelayConfig;
use crate::session::handle_session;

pub struct Server {
    registry: Arc<Mutex<ConnectionRegistry>>,
    liveness: Arc<Mutex<LivenessTracker>>,
    listener: TcpListener,
    config: RelayConfig,
}

impl Server {
    pub async fn new(config: RelayConfig) -> Self {
        let bind_addr = config.bind_addr();
        let listener = match TcpListener::bind(&bind_addr).await {
            Ok(listener) => {
                info!("Server bound to {}", bind_addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", bind_addr, e);
                panic!("Server startup failed on socket {}: {}", bind_addr, e);
            }
        };

        Self {
            registry: Arc::new(Mutex::new(ConnectionRegistry::new())),
            liveness: Arc::new(Mutex::new(LivenessTracker::new())),
            listener,
            config,
        }
    }

    /// Actual bound address, for callers that asked for port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.listener
            .local_addr()
            .expect("listener has a local address")
    }

    /// Current connection count, for liveness/readiness reporting.
    pub async fn connection_count(&self) -> usize {
        self.registry.lock().await.len()
    }

    pub async fn start(&self) {
        info!(
            "Starting relay server on {} (sweep every {}s, timeout {}s)",
            self.config.bind_addr(),
            self.config.sweep_interval_secs,
            self.config.liveness_timeout_secs
        );

        spawn_sweeper(
            Arc::clone(&self.registry),
            Arc::clone(&self.liveness),
            self.config.sweep_interval(),
            self.config.liveness_timeout(),
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let registry = Arc::clone(&self.registry);
                    let liveness = Arc::clone(&self.liveness);

                    // Spawn a task for each client so the accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) = handle_new_client(stream, addr, registry, liveness).await {
                            warn!("Failed to handle client {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Handles a new connection: reads the identifier line, then hands off to the
/// session handler. Identifier-format rules beyond non-empty are out of scope
/// here; callers are expected to have validated the identifier shape upstream.
async fn handle_new_client(
    stream: TcpStream,
    addr: SocketAddr,
    registry: Arc<Mutex<ConnectionRegistry>>,
    liveness: Arc<Mutex<LivenessTracker>>,
) -> Result<(), HandshakeError> {
    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Err(HandshakeError::Disconnected);
    }
    if line.len() > MAX_RECORD_LENGTH {
        return Err(HandshakeError::OversizedIdentifier(line.len()));
    }

    let client_id = line.trim();
    if client_id.is_empty() {
        return Err(HandshakeError::EmptyIdentifier);
    }

    info!("Client {} identified as {}", addr, client_id);
    handle_session(reader, write_half, client_id.to_string(), registry, liveness).await;
    Ok(())
}
