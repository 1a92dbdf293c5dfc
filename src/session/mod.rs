//! Per-connection session management
//!
//! Owns the lifecycle of one client connection: registration, record
//! dispatch, and the single exit path that deregisters and rebroadcasts.

pub mod handler;

pub use handler::handle_session;
