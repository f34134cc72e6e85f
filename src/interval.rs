use std::time::{Duration, Instant};

/// Fixed-step pacer for the headless runner.
pub struct Interval {
    internal_time: Instant,
    max_difference: Duration,
    target_interval: Duration,
}
impl Interval {
    pub fn new(interval: u64, max_difference: u64) -> Self {
        Self {
            internal_time: Instant::now(),
            max_difference: Duration::from_millis(max_difference),
            target_interval: Duration::from_millis(interval),
        }
    }

    /// Sleep until the next step is due.
    /// Returns how far behind schedule we were, if at all.
    pub fn step(&mut self) -> Duration {
        let now = Instant::now();

        self.internal_time += self.target_interval;

        let behind = now.saturating_duration_since(self.internal_time);
        if behind > self.max_difference {
            log::debug!(
                "Interval behind by {}ms which is more than maximum of {}ms",
                behind.as_millis(),
                self.max_difference.as_millis()
            );
            self.internal_time = now - self.max_difference;
        }

        if let Some(delay) = self.internal_time.checked_duration_since(now) {
            std::thread::sleep(delay);
        }

        behind
    }
}
