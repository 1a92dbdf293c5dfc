//! Liveness tracking
//!
//! Records last-activity timestamps per connection and periodically evicts
//! identifiers that have gone silent past the configured timeout.

pub mod sweeper;
pub mod tracker;

pub use sweeper::spawn_sweeper;
pub use tracker::LivenessTracker;
