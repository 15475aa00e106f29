//! Scroll position smoothing with exponential ease-out.
//!
//! Key presses and wheel notches move a target; each frame the displayed
//! position closes a fixed fraction of the remaining distance, so the
//! stream fed into the scroll container decelerates visibly instead of
//! jumping a whole page at once.

/// Eases the scroll position towards a clamped target.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    position: f64,
    target: f64,
    /// Fraction of the remaining distance covered per tick.
    /// Good range: 0.2–0.4 at 60 fps.
    speed: f64,
}

impl SmoothScroll {
    pub fn new(speed: f64) -> Self {
        Self {
            position: 0.0,
            target: 0.0,
            speed: speed.clamp(0.05, 0.95),
        }
    }

    /// Aim at `target`, clamped to `[0, max]`.
    pub fn set_target(&mut self, target: f64, max: f64) {
        self.target = target.clamp(0.0, max.max(0.0));
    }

    /// Move the target by `delta`.
    pub fn nudge(&mut self, delta: f64, max: f64) {
        self.set_target(self.target + delta, max);
    }

    /// Keep the target inside a range that just shrank.
    pub fn clamp_to(&mut self, max: f64) {
        let max = max.max(0.0);
        self.target = self.target.min(max);
        self.position = self.position.min(max);
    }

    /// Advance one frame.  Returns whether the position changed.
    pub fn tick(&mut self) -> bool {
        if !self.is_animating() {
            return false;
        }
        self.position += (self.target - self.position) * self.speed;
        if (self.target - self.position).abs() < 0.05 {
            self.position = self.target;
        }
        true
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// True until the position has settled on the target.
    pub fn is_animating(&self) -> bool {
        self.position != self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eases_out_and_settles_on_the_target() {
        let mut smooth = SmoothScroll::new(0.3);
        smooth.set_target(100.0, 500.0);
        assert!(smooth.tick());
        let first = smooth.position();
        assert!((first - 30.0).abs() < 1e-9);
        smooth.tick();
        assert!(smooth.position() - first < first, "steps shrink");

        for _ in 0..200 {
            smooth.tick();
        }
        assert_eq!(smooth.position(), 100.0);
        assert!(!smooth.is_animating());
        assert!(!smooth.tick());
    }

    #[test]
    fn target_stays_in_range() {
        let mut smooth = SmoothScroll::new(0.3);
        smooth.nudge(-10.0, 50.0);
        assert_eq!(smooth.target(), 0.0);
        smooth.nudge(80.0, 50.0);
        assert_eq!(smooth.target(), 50.0);
        smooth.clamp_to(20.0);
        assert_eq!(smooth.target(), 20.0);
    }
}
