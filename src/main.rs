//! Pulse Relay - Entry Point
//!
//! A real-time presence and point-to-point message relay server.

use env_logger;
use log::{info, warn};

use pulse_relay::{RelayConfig, Server};

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let config = match RelayConfig::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load configuration ({}), using defaults", e);
            RelayConfig::default()
        }
    };

    info!("Launching relay server...");

    let server = Server::new(config).await;
    server.start().await;
}
