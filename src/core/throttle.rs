//! Leading + trailing throttle as an explicit state machine.
//!
//! The first event of a burst fires immediately.  Events arriving inside the
//! interval overwrite a single pending slot, which fires once the interval
//! since the last fire has elapsed.  Nothing here owns a timer: the host asks
//! for [`Throttle::next_deadline`] and calls [`Throttle::poll`] when it
//! passes.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last_fire: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fire: None,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Offer `value` at time `now`.  Returns it when it should be processed
    /// immediately; otherwise it becomes the pending trailing value.
    pub fn call(&mut self, now: Instant, value: T) -> Option<T> {
        if self.is_open(now) {
            // A newer value supersedes any trailing one we never got to fire.
            self.pending = None;
            self.last_fire = Some(now);
            return Some(value);
        }
        self.pending = Some(value);
        None
    }

    /// Fire the trailing value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_none() || !self.is_open(now) {
            return None;
        }
        self.last_fire = Some(now);
        self.pending.take()
    }

    /// When the pending trailing value becomes due, if there is one.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        Some(self.last_fire.map_or_else(Instant::now, |at| at + self.interval))
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending trailing value.  Nothing fires afterwards unless a
    /// new value is offered.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    fn is_open(&self, now: Instant) -> bool {
        match self.last_fire {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= self.interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(90);

    #[test]
    fn burst_fires_leading_and_trailing_once() {
        let start = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        let mut fired = Vec::new();

        for i in 0..10u64 {
            let now = start + Duration::from_millis(i * 5);
            if let Some(v) = throttle.call(now, i) {
                fired.push(v);
            }
            if let Some(v) = throttle.poll(now) {
                fired.push(v);
            }
        }
        assert_eq!(fired, vec![0]);
        assert_eq!(throttle.next_deadline(), Some(start + INTERVAL));

        fired.extend(throttle.poll(start + INTERVAL));
        fired.extend(throttle.poll(start + INTERVAL * 3));
        assert_eq!(fired, vec![0, 9]);
    }

    #[test]
    fn single_event_has_no_trailing_fire() {
        let start = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        assert_eq!(throttle.call(start, 1.0), Some(1.0));
        assert_eq!(throttle.next_deadline(), None);
        assert_eq!(throttle.poll(start + INTERVAL * 2), None);
    }

    #[test]
    fn trailing_fire_restarts_interval() {
        let start = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        throttle.call(start, 1);
        throttle.call(start + Duration::from_millis(10), 2);
        assert_eq!(throttle.poll(start + INTERVAL), Some(2));

        // Inside the interval that the trailing fire opened.
        let again = start + INTERVAL + Duration::from_millis(10);
        assert_eq!(throttle.call(again, 3), None);
        assert_eq!(throttle.next_deadline(), Some(start + INTERVAL * 2));
    }

    #[test]
    fn zero_interval_passes_everything_through() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::ZERO);
        assert_eq!(throttle.call(start, 1), Some(1));
        assert_eq!(throttle.call(start, 2), Some(2));
        assert!(!throttle.has_pending());
    }

    #[test]
    fn cancel_discards_pending_value() {
        let start = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        throttle.call(start, 1);
        throttle.call(start + Duration::from_millis(1), 2);
        throttle.cancel();
        assert_eq!(throttle.poll(start + INTERVAL * 2), None);
    }
}
