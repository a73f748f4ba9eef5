//! Cancelable Trailing-Edge Debouncer
//!
//! Pointer-move events fire at high frequency; hover picking runs on a
//! trailing-edge debounce instead. The debouncer holds at most one pending
//! value with an explicit deadline and is driven by the caller's clock
//! (`Instant`s passed in), never a background timer — which is what makes
//! it deterministic to test and trivially cancelable on unmount.

use std::time::{Duration, Instant};

/// Holds the latest value until `delay` elapses without a newer one.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Records `value`, restarting the delay from `now`.
    pub fn call(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Returns the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    /// Drops any pending value so a trailing call never fires.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Whether a value is waiting on its deadline.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_edge_fires_after_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        debouncer.call(1, start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(10)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(50)), Some(1));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn newer_calls_supersede_and_restart() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        debouncer.call(1, start);
        debouncer.call(2, start + Duration::from_millis(40));
        // First deadline passed, but it was superseded.
        assert_eq!(debouncer.poll(start + Duration::from_millis(60)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(90)), Some(2));
    }

    #[test]
    fn cancel_drops_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        debouncer.call(7, start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }
}
