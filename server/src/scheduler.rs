use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Fixed-rate tick source for the simulation.
///
/// Missed ticks are skipped rather than replayed: under load the match simply
/// advances fewer times, it never bursts to catch up.
pub struct TickScheduler {
    interval: Interval,
    fired: u64,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self { interval, fired: 0 }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    /// Number of ticks fired so far.
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Waits for the next tick. Cancel-safe, so it can sit in a `select!`.
    pub async fn tick(&mut self) -> u64 {
        self.interval.tick().await;
        self.fired += 1;
        self.fired
    }
}
