//! Error types for the relay server.
//!
//! Almost every failure in this server is absorbed locally and turned into a
//! registry-state change; the types here cover the few that surface at the
//! accept boundary plus record-parse failures.

pub mod types;

pub use types::{HandshakeError, ProtocolError};
