//! Server core functionality
//!
//! This module contains the accept loop, the connection handshake, and the
//! server configuration.

pub mod config;
pub mod core;

pub use config::RelayConfig;
pub use core::Server;
