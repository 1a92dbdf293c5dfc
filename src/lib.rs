pub mod broadcast;
pub mod error;
pub mod liveness;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;

pub use server::{RelayConfig, Server};
