use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;
pub const DEFAULT_MAX_CLIENTS: usize = 32;
/// Frames queued per connection before further broadcasts are dropped.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 64;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub tick_rate_hz: u32,
    pub max_clients: usize,
    /// Score that ends the match; `None` plays forever.
    pub score_limit: Option<u32>,
    /// Seed for ball serves; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub outbox_capacity: usize,
}

impl ServerConfig {
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            max_clients: DEFAULT_MAX_CLIENTS,
            score_limit: None,
            seed: None,
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
        }
    }
}
