//! Last-activity bookkeeping per connection.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tracks when each identifier was last seen doing anything (connect, any
/// inbound record, explicit heartbeat). Kept in lockstep with the connection
/// registry: entries are added on register and removed together with it.
pub struct LivenessTracker {
    last_seen: HashMap<String, Instant>,
}

impl LivenessTracker {
    pub fn new() -> Self {
        Self {
            last_seen: HashMap::new(),
        }
    }

    /// Records activity for `id` at the current instant.
    pub fn touch(&mut self, id: &str) {
        self.last_seen.insert(id.to_string(), Instant::now());
    }

    /// Removes the record for `id`. No-op if absent, so a sweep racing a
    /// disconnect is harmless on either side.
    pub fn remove(&mut self, id: &str) {
        self.last_seen.remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.last_seen.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    /// Drops every identifier silent for longer than `timeout` as of `now`
    /// and returns the evicted set. The caller is responsible for removing
    /// the same identifiers from the connection registry.
    pub fn sweep(&mut self, now: Instant, timeout: Duration) -> Vec<String> {
        let evicted: Vec<String> = self
            .last_seen
            .iter()
            .filter(|(_, seen)| now.saturating_duration_since(**seen) > timeout)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &evicted {
            self.last_seen.remove(id);
        }

        evicted
    }
}

impl Default for LivenessTracker {
    fn default() -> Self {
        Self::new()
    }
}
