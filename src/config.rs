use std::time::Duration;

pub const DEFAULT_INGRESS: &str = "127.0.0.1:5562";
pub const DEFAULT_EGRESS: &str = "127.0.0.1:5561";

/// Settings of a [`LakeBus`](crate::infrastructure::bus::LakeBus).
#[derive(Debug, Clone, PartialEq)]
pub struct BusConfig {
    /// Address producers push frames to.
    pub ingress: String,
    /// Address subscribers receive published frames from.
    pub egress: String,
    /// Upper bound of a single listener receive. Also bounds how long `stop`
    /// waits for the listener.
    pub poll_interval: Duration,
    /// Frames queued between the ingress endpoint and the listener.
    pub ingress_capacity: usize,
    /// Frames a slow subscriber may lag behind before it skips ahead.
    pub egress_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            ingress: DEFAULT_INGRESS.to_string(),
            egress: DEFAULT_EGRESS.to_string(),
            poll_interval: Duration::from_secs(1),
            ingress_capacity: 100,
            egress_capacity: 1024,
        }
    }
}

impl BusConfig {
    /// Both endpoints on ephemeral loopback ports.
    pub fn ephemeral() -> Self {
        Self {
            ingress: "127.0.0.1:0".to_string(),
            egress: "127.0.0.1:0".to_string(),
            ..Self::default()
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}
