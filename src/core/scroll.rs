//! Scroll position and velocity streams, one pair per axis.
//!
//! Hosts record raw positions as they arrive.  Velocity is estimated from
//! consecutive samples and smoothed by a spring, which the host steps with
//! [`ScrollStream::tick`] once per frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{trace, warn};

use super::geometry::Axis;
use super::signal::{Signal, Subscription};
use super::spring::{Spring, SpringConfig};

/// Without a fresh sample for this long, raw velocity is treated as zero.
pub const VELOCITY_STALE_AFTER: Duration = Duration::from_millis(30);

/// Smoothing applied to raw scroll velocity.
pub const VELOCITY_SPRING: SpringConfig = SpringConfig {
    mass: 0.05,
    stiffness: 100.0,
    damping: 10.0,
    rest_delta: 0.01,
    rest_speed: 2.0,
};

/// Position and velocity on one axis at one moment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollSample {
    pub position: f64,
    pub velocity: f64,
}

#[derive(Debug)]
struct AxisChannel {
    position: Signal<f64>,
    velocity: Signal<f64>,
    last_sample: Cell<Option<(f64, Instant)>>,
    last_tick: Cell<Option<Instant>>,
    smoother: RefCell<Spring>,
}

impl AxisChannel {
    fn new() -> Self {
        Self {
            position: Signal::new(0.0),
            velocity: Signal::new(0.0),
            last_sample: Cell::new(None),
            last_tick: Cell::new(None),
            smoother: RefCell::new(Spring::new(0.0, VELOCITY_SPRING)),
        }
    }

    fn record(&self, position: f64, at: Instant) {
        if let Some((previous, previous_at)) = self.last_sample.get() {
            let dt = at.saturating_duration_since(previous_at).as_secs_f64();
            if dt > 0.0 {
                self.smoother.borrow_mut().set((position - previous) / dt);
            }
        }
        self.last_sample.set(Some((position, at)));
        self.position.set(position);
    }

    fn tick(&self, now: Instant) {
        let stale = self
            .last_sample
            .get()
            .is_none_or(|(_, at)| now.saturating_duration_since(at) >= VELOCITY_STALE_AFTER);
        let dt = self
            .last_tick
            .get()
            .map_or(Duration::ZERO, |at| now.saturating_duration_since(at));
        self.last_tick.set(Some(now));

        let velocity = {
            let mut smoother = self.smoother.borrow_mut();
            if stale {
                smoother.set(0.0);
            }
            smoother.step(dt);
            smoother.get()
        };
        // Publish outside the borrow: subscribers may read the stream.
        self.velocity.set(velocity);
    }

    fn set_velocity(&self, velocity: f64) {
        self.smoother.borrow_mut().jump(velocity);
        self.velocity.set(velocity);
    }
}

#[derive(Debug)]
struct ScrollInner {
    x: AxisChannel,
    y: AxisChannel,
}

/// Live scroll position and velocity for both axes.
///
/// Cloning shares the stream.
#[derive(Debug, Clone)]
pub struct ScrollStream {
    inner: Rc<ScrollInner>,
}

impl Default for ScrollStream {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollStream {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScrollInner {
                x: AxisChannel::new(),
                y: AxisChannel::new(),
            }),
        }
    }

    fn channel(&self, axis: Axis) -> &AxisChannel {
        match axis {
            Axis::X => &self.inner.x,
            Axis::Y => &self.inner.y,
        }
    }

    /// Record a raw scroll position observed at `at`.  Non-finite positions
    /// are dropped.
    pub fn record(&self, axis: Axis, position: f64, at: Instant) {
        if !position.is_finite() {
            warn!(%axis, position, "ignoring non-finite scroll position");
            return;
        }
        trace!(%axis, position, "scroll sample");
        self.channel(axis).record(position, at);
    }

    /// Publish a host-computed velocity, bypassing estimation.
    pub fn set_velocity(&self, axis: Axis, velocity: f64) {
        if velocity.is_finite() {
            self.channel(axis).set_velocity(velocity);
        }
    }

    /// Step the velocity smoothers to `now`.
    pub fn tick(&self, now: Instant) {
        self.inner.x.tick(now);
        self.inner.y.tick(now);
    }

    pub fn position(&self, axis: Axis) -> f64 {
        self.channel(axis).position.get()
    }

    pub fn velocity(&self, axis: Axis) -> f64 {
        self.channel(axis).velocity.get()
    }

    pub fn sample(&self, axis: Axis) -> ScrollSample {
        ScrollSample {
            position: self.position(axis),
            velocity: self.velocity(axis),
        }
    }

    pub fn on_position(&self, axis: Axis, subscriber: impl Fn(&f64) + 'static) -> Subscription {
        self.channel(axis).position.subscribe(subscriber)
    }

    pub fn on_velocity(&self, axis: Axis, subscriber: impl Fn(&f64) + 'static) -> Subscription {
        self.channel(axis).velocity.subscribe(subscriber)
    }

    /// Live position and velocity subscribers on `axis`.
    pub fn subscriber_count(&self, axis: Axis) -> usize {
        let channel = self.channel(axis);
        channel.position.subscriber_count() + channel.velocity.subscriber_count()
    }

    /// Whether a velocity smoother is still moving.
    pub fn is_settling(&self) -> bool {
        !self.inner.x.smoother.borrow().is_at_rest() || !self.inner.y.smoother.borrow().is_at_rest()
    }
}
