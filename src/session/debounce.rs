//! Trailing-edge debounce driven by a caller-supplied clock.

use std::time::{Duration, Instant};

/// Fires once, `delay` after the most recent [`touch`](Self::touch).
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record activity at `now`, restarting the wait.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once per burst, on the first call at or after the
    /// deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn fires_once_after_a_burst() {
        let start = Instant::now();
        let mut debounce = Debouncer::new(500 * MS);
        for i in 0..10 {
            debounce.touch(start + 100 * i * MS);
            assert!(!debounce.fire(start + (100 * i + 50) * MS));
        }
        // Last touch at 900ms.
        assert!(!debounce.fire(start + 1399 * MS));
        assert!(debounce.fire(start + 1400 * MS));
        assert!(!debounce.fire(start + 5000 * MS));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn idle_never_fires() {
        let mut debounce = Debouncer::new(500 * MS);
        assert!(!debounce.fire(Instant::now() + 10_000 * MS));
    }

    #[test]
    fn cancel_drops_the_pending_fire() {
        let start = Instant::now();
        let mut debounce = Debouncer::new(500 * MS);
        debounce.touch(start);
        debounce.cancel();
        assert!(!debounce.fire(start + 1000 * MS));
    }
}
