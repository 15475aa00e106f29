//! Damped-spring smoothing of property values.
//!
//! Each step solves the damped harmonic oscillator in closed form over the
//! elapsed time, so the result does not depend on frame rate and large
//! steps stay stable.

use std::time::Duration;

use serde::Deserialize;

use super::style::{PropertyFamily, StyleProperty, StyleValue};

/// Spring parameters.  Velocities are in units per second.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub mass: f64,
    pub stiffness: f64,
    pub damping: f64,
    /// Distance from the target under which the spring may come to rest.
    pub rest_delta: f64,
    /// Speed under which the spring may come to rest.
    pub rest_speed: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            stiffness: 100.0,
            damping: 10.0,
            rest_delta: 0.01,
            rest_speed: 2.0,
        }
    }
}

impl SpringConfig {
    /// Default tuning for `property`'s family.
    pub fn for_property(property: StyleProperty) -> Self {
        let base = Self::default();
        match property.family() {
            PropertyFamily::Translate | PropertyFamily::Rotate | PropertyFamily::Color => Self {
                mass: 0.05,
                damping: 7.5,
                stiffness: 100.0,
                ..base
            },
            PropertyFamily::Scale | PropertyFamily::Opacity => Self {
                mass: if property.family() == PropertyFamily::Scale { 0.05 } else { 0.1 },
                damping: 20.0,
                rest_delta: 1e-9,
                rest_speed: 1e-9,
                ..base
            },
            PropertyFamily::Skew => Self {
                mass: 0.1,
                damping: 20.0,
                ..base
            },
        }
    }

    /// Damping ratio; `1` is critical.
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    fn is_degenerate(&self) -> bool {
        !(self.mass > 0.0 && self.stiffness > 0.0 && self.damping >= 0.0)
            || !self.mass.is_finite()
            || !self.stiffness.is_finite()
            || !self.damping.is_finite()
    }
}

/// Partial spring parameters layered over a family default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpringOverride {
    pub mass: Option<f64>,
    pub stiffness: Option<f64>,
    pub damping: Option<f64>,
    pub rest_delta: Option<f64>,
    pub rest_speed: Option<f64>,
}

impl SpringOverride {
    pub fn apply(&self, base: SpringConfig) -> SpringConfig {
        SpringConfig {
            mass: self.mass.unwrap_or(base.mass),
            stiffness: self.stiffness.unwrap_or(base.stiffness),
            damping: self.damping.unwrap_or(base.damping),
            rest_delta: self.rest_delta.unwrap_or(base.rest_delta),
            rest_speed: self.rest_speed.unwrap_or(base.rest_speed),
        }
    }

    /// Layer `other` on top of `self`.
    pub fn or(self, other: SpringOverride) -> SpringOverride {
        SpringOverride {
            mass: other.mass.or(self.mass),
            stiffness: other.stiffness.or(self.stiffness),
            damping: other.damping.or(self.damping),
            rest_delta: other.rest_delta.or(self.rest_delta),
            rest_speed: other.rest_speed.or(self.rest_speed),
        }
    }
}

// ───────────────────────────────────────── scalar spring ─────

/// One damped spring on a scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    value: f64,
    velocity: f64,
    target: f64,
    config: SpringConfig,
    at_rest: bool,
}

impl Spring {
    pub fn new(value: f64, config: SpringConfig) -> Self {
        let value = if value.is_finite() { value } else { 0.0 };
        Self {
            value,
            velocity: 0.0,
            target: value,
            config,
            at_rest: true,
        }
    }

    pub fn get(&self) -> f64 {
        self.value
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
    }

    /// Move the target.  Non-finite targets are ignored.
    pub fn set(&mut self, target: f64) {
        if !target.is_finite() || target == self.target {
            return;
        }
        self.target = target;
        self.at_rest = false;
    }

    /// Teleport to `value` and stop.
    pub fn jump(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
        self.at_rest = true;
    }

    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Advance by `dt`.  Returns whether the spring is still moving.
    pub fn step(&mut self, dt: Duration) -> bool {
        if self.at_rest {
            return false;
        }
        let t = dt.as_secs_f64();
        if t <= 0.0 {
            return true;
        }
        if self.config.is_degenerate() {
            self.jump(self.target);
            return false;
        }

        let (x, v) = solve(&self.config, self.value - self.target, self.velocity, t);
        if !x.is_finite() || !v.is_finite() {
            self.jump(self.target);
            return false;
        }
        self.value = self.target + x;
        self.velocity = v;

        if x.abs() <= self.config.rest_delta && v.abs() <= self.config.rest_speed {
            self.jump(self.target);
            return false;
        }
        true
    }
}

/// Displacement and velocity after `t` seconds, starting from displacement
/// `x0` and velocity `v0`.
fn solve(config: &SpringConfig, x0: f64, v0: f64, t: f64) -> (f64, f64) {
    let omega = (config.stiffness / config.mass).sqrt();
    let zeta = config.damping_ratio();

    if (zeta - 1.0).abs() < 1e-6 {
        let c = v0 + omega * x0;
        let decay = (-omega * t).exp();
        return (decay * (x0 + c * t), decay * (v0 - omega * c * t));
    }

    if zeta < 1.0 {
        let a = zeta * omega;
        let wd = omega * (1.0 - zeta * zeta).sqrt();
        let b = (v0 + a * x0) / wd;
        let decay = (-a * t).exp();
        let (sin, cos) = (wd * t).sin_cos();
        return (
            decay * (x0 * cos + b * sin),
            decay * (v0 * cos - (a * b + x0 * wd) * sin),
        );
    }

    let root = (zeta * zeta - 1.0).sqrt();
    let r1 = -omega * (zeta - root);
    let r2 = -omega * (zeta + root);
    let c1 = (v0 - r2 * x0) / (r1 - r2);
    let c2 = x0 - c1;
    let (e1, e2) = ((r1 * t).exp(), (r2 * t).exp());
    (c1 * e1 + c2 * e2, r1 * c1 * e1 + r2 * c2 * e2)
}

// ───────────────────────────────────────── style spring ──────

/// Spring over a [`StyleValue`]: one scalar spring per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SpringValue {
    template: StyleValue,
    channels: Vec<Spring>,
}

/// Create a smoother resting at `initial`.
pub fn create_spring(initial: StyleValue, config: SpringConfig) -> SpringValue {
    SpringValue::new(initial, config)
}

impl SpringValue {
    pub fn new(initial: StyleValue, config: SpringConfig) -> Self {
        Self {
            template: initial,
            channels: initial
                .components()
                .into_iter()
                .map(|c| Spring::new(c, config))
                .collect(),
        }
    }

    /// Current smoothed value.
    pub fn get(&self) -> StyleValue {
        let values: Vec<f64> = self.channels.iter().map(Spring::get).collect();
        self.template.with_components(&values)
    }

    pub fn target(&self) -> StyleValue {
        let targets: Vec<f64> = self.channels.iter().map(Spring::target).collect();
        self.template.with_components(&targets)
    }

    /// Retarget.  A target that cannot interpolate from the current value
    /// (colour vs number, different units) is jumped to instead.
    pub fn set(&mut self, target: StyleValue) {
        if !self.template.is_compatible(&target) {
            self.jump(target);
            return;
        }
        if target.unit().is_some() {
            self.template = target;
        }
        for (spring, channel) in self.channels.iter_mut().zip(target.components()) {
            spring.set(channel);
        }
    }

    pub fn jump(&mut self, value: StyleValue) {
        let config = self.config();
        *self = Self::new(value, config);
    }

    pub fn config(&self) -> SpringConfig {
        self.channels
            .first()
            .map(Spring::config)
            .unwrap_or_default()
    }

    pub fn set_config(&mut self, config: SpringConfig) {
        for spring in &mut self.channels {
            spring.set_config(config);
        }
    }

    /// Advance every channel.  Returns whether any channel is still moving.
    pub fn step(&mut self, dt: Duration) -> bool {
        self.channels
            .iter_mut()
            .fold(false, |moving, spring| spring.step(dt) | moving)
    }

    pub fn is_at_rest(&self) -> bool {
        self.channels.iter().all(Spring::is_at_rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::style::Unit;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn settle(spring: &mut Spring, max_steps: usize) -> usize {
        for i in 0..max_steps {
            if !spring.step(FRAME) {
                return i + 1;
            }
        }
        panic!("spring still moving after {max_steps} steps: {spring:?}");
    }

    #[test]
    fn translate_spring_settles_and_stays() {
        let config = SpringConfig::for_property(StyleProperty::TranslateY);
        let mut spring = Spring::new(0.0, config);
        spring.set(100.0);
        settle(&mut spring, 600);
        assert!((spring.get() - 100.0).abs() <= config.rest_delta);
        for _ in 0..120 {
            spring.step(FRAME);
            assert!((spring.get() - 100.0).abs() <= config.rest_delta);
        }
    }

    #[test]
    fn every_default_profile_settles() {
        for &property in StyleProperty::ALL {
            let config = SpringConfig::for_property(property);
            let mut spring = Spring::new(0.0, config);
            spring.set(1.0);
            settle(&mut spring, 2_000);
            assert_eq!(spring.get(), 1.0, "{property}");
        }
    }

    #[test]
    fn underdamped_and_critical_springs_converge() {
        for damping in [2.0, 2.0 * (100.0_f64 * 0.05).sqrt()] {
            let config = SpringConfig {
                mass: 0.05,
                damping,
                ..SpringConfig::default()
            };
            let mut spring = Spring::new(-50.0, config);
            spring.set(50.0);
            settle(&mut spring, 2_000);
            assert_eq!(spring.get(), 50.0);
        }
    }

    #[test]
    fn overdamped_spring_does_not_overshoot() {
        let config = SpringConfig::for_property(StyleProperty::Scale);
        assert!(config.damping_ratio() > 1.0);
        let mut spring = Spring::new(1.0, config);
        spring.set(2.0);
        for _ in 0..300 {
            spring.step(FRAME);
            assert!(spring.get() <= 2.0);
        }
    }

    #[test]
    fn degenerate_config_snaps() {
        let config = SpringConfig {
            mass: 0.0,
            ..SpringConfig::default()
        };
        let mut spring = Spring::new(0.0, config);
        spring.set(10.0);
        assert!(!spring.step(FRAME));
        assert_eq!(spring.get(), 10.0);
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        spring.set(10.0);
        assert!(spring.step(Duration::ZERO));
        assert_eq!(spring.get(), 0.0);
    }

    #[test]
    fn style_spring_snaps_on_kind_change() {
        let mut spring = create_spring(StyleValue::px(0.0), SpringConfig::default());
        spring.set(StyleValue::percent(50.0));
        assert_eq!(spring.get(), StyleValue::percent(50.0));
        assert!(spring.is_at_rest());
    }

    #[test]
    fn bare_number_spring_adopts_unit() {
        let mut spring = create_spring(StyleValue::Number(0.0), SpringConfig::default());
        spring.set(StyleValue::px(40.0));
        assert_eq!(spring.target(), StyleValue::px(40.0));
        assert_eq!(spring.get(), StyleValue::Dimension(0.0, Unit::Px));
    }

    #[test]
    fn colour_spring_moves_every_channel() {
        let config = SpringConfig::for_property(StyleProperty::Color);
        let mut spring = create_spring(StyleValue::rgb(0, 0, 0), config);
        spring.set(StyleValue::rgb(255, 255, 255));
        spring.step(FRAME);
        let mid = spring.get().as_color().unwrap();
        assert!(mid.red > 0.0 && mid.green > 0.0 && mid.blue > 0.0);
        while spring.step(FRAME) {}
        assert_eq!(spring.get(), StyleValue::rgb(255, 255, 255));
    }

    #[test]
    fn overrides_layer_over_family_defaults() {
        let base = SpringConfig::for_property(StyleProperty::Opacity);
        let tuned = SpringOverride {
            stiffness: Some(300.0),
            ..Default::default()
        }
        .apply(base);
        assert_eq!(tuned.stiffness, 300.0);
        assert_eq!(tuned.mass, base.mass);
        assert_eq!(tuned.damping, base.damping);
    }
}
