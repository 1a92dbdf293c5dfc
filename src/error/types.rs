//! Error types
//!
//! Defines domain-specific error types for the relay server modules.

use std::fmt;
use std::io;

/// Handshake errors, surfaced by the accept path before a session exists
#[derive(Debug)]
pub enum HandshakeError {
    EmptyIdentifier,
    OversizedIdentifier(usize),
    Disconnected,
    Io(io::Error),
}

impl fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeError::EmptyIdentifier => write!(f, "Empty client identifier"),
            HandshakeError::OversizedIdentifier(len) => {
                write!(f, "Identifier line too long: {} bytes", len)
            }
            HandshakeError::Disconnected => {
                write!(f, "Client disconnected during handshake")
            }
            HandshakeError::Io(e) => write!(f, "I/O error during handshake: {}", e),
        }
    }
}

impl std::error::Error for HandshakeError {}

impl From<io::Error> for HandshakeError {
    fn from(error: io::Error) -> Self {
        HandshakeError::Io(error)
    }
}

/// Record parsing errors; malformed records are dropped, never fatal
#[derive(Debug)]
pub enum ProtocolError {
    Malformed(serde_json::Error),
    Oversized(usize),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Malformed(e) => write!(f, "Malformed record: {}", e),
            ProtocolError::Oversized(len) => {
                write!(f, "Record too long: {} bytes", len)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<serde_json::Error> for ProtocolError {
    fn from(error: serde_json::Error) -> Self {
        ProtocolError::Malformed(error)
    }
}
