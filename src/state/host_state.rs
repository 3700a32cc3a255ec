use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Tracks requests made to a single host during one operation
#[derive(Debug, Clone, Default)]
pub struct HostState {
    /// Number of requests made to this host
    pub request_count: u32,

    /// Timestamp of the last request to this host
    pub last_request_time: Option<Instant>,
}

impl HostState {
    /// Records that a request was made to this host
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, spacing: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < spacing {
            Some(spacing - elapsed)
        } else {
            None
        }
    }
}

/// Enforces a minimum delay between consecutive requests to the same host
#[derive(Debug)]
pub struct HostPacer {
    spacing: Duration,
    hosts: HashMap<String, HostState>,
}

impl HostPacer {
    /// Creates a pacer with the given minimum spacing between requests
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            hosts: HashMap::new(),
        }
    }

    /// Waits until `host` may be requested again, then records the request
    pub async fn wait_turn(&mut self, host: &str) {
        let state = self.hosts.entry(host.to_string()).or_default();

        if let Some(wait) = state.time_until_next_request(self.spacing, Instant::now()) {
            tracing::trace!("Pacing request to {} for {:?}", host, wait);
            tokio::time::sleep(wait).await;
        }

        state.record_request(Instant::now());
    }

    /// Total number of requests recorded across all hosts
    pub fn total_requests(&self) -> u32 {
        self.hosts.values().map(|s| s.request_count).sum()
    }

    /// Number of distinct hosts requested so far
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }
}
