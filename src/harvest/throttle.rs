//! Pacing toward the shared external target
//!
//! Every externally observable action (page load, sub-navigation, scroll)
//! is preceded by a uniformly random pause drawn from a configured range.
//! The pause bounds the request rate toward a target that enforces its own
//! limits; it applies on retries too and is never skipped.

use rand::Rng;
use std::time::Duration;

/// Mandatory randomized delay between observable page actions
#[derive(Debug, Clone)]
pub struct Throttle {
    min: Duration,
    max: Duration,
}

impl Throttle {
    /// Creates a throttle over the given min/max bounds
    pub fn new(range: (Duration, Duration)) -> Self {
        let (min, max) = range;
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Sleeps for a uniformly random duration from the configured range
    pub async fn pause(&self) {
        let delay = self.pick();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn pick(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let millis = rand::thread_rng().gen_range(self.min.as_millis() as u64..=self.max.as_millis() as u64);
        Duration::from_millis(millis)
    }
}
