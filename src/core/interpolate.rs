//! Piecewise interpolation of one property across normalised keyframes.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::warn;

use super::keyframes::NormalizedKeyframeMap;
use super::style::{StyleProperty, StyleValue, Unit};
use crate::error::Error;

/// Timing curve applied inside each segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Map segment-local `t` in `[0, 1]` onto itself.  Every curve is
    /// monotonic and fixes both end points.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
        }
    }

    pub const ALL: &[Easing] = &[
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
    ];

    /// The curve after this one, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|&e| e == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Easing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Easing::Linear),
            "ease-in" | "easein" => Ok(Easing::EaseIn),
            "ease-out" | "easeout" => Ok(Easing::EaseOut),
            "ease-in-out" | "easeinout" => Ok(Easing::EaseInOut),
            _ => Err(Error::InvalidEasing(s.to_string())),
        }
    }
}

/// Progress → value for a single property.  Always holds at least two stops
/// with strictly ascending progress.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInterpolator {
    property: StyleProperty,
    stops: Vec<(f64, StyleValue)>,
    easing: Easing,
}

impl PropertyInterpolator {
    pub fn property(&self) -> StyleProperty {
        self.property
    }

    pub fn stops(&self) -> &[(f64, StyleValue)] {
        &self.stops
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Value at `progress`.  Clamps to the first and last stop outside their
    /// range; NaN reads as the first stop.
    pub fn get(&self, progress: f64) -> StyleValue {
        let (first_at, first) = self.stops[0];
        let (last_at, last) = self.stops[self.stops.len() - 1];
        if progress.is_nan() || progress <= first_at {
            return first;
        }
        if progress >= last_at {
            return last;
        }
        // first_at < progress < last_at, so 1 <= upper < len.
        let upper = self.stops.partition_point(|(at, _)| *at <= progress);
        let (from_at, from) = self.stops[upper - 1];
        let (to_at, to) = self.stops[upper];
        let t = (progress - from_at) / (to_at - from_at);
        from.lerp(&to, self.easing.apply(t))
    }
}

/// Build the interpolator for `property`, or `None` when no keyframe
/// mentions it.
///
/// The first value fixes the kind; later values that cannot interpolate
/// against it are dropped.  Once a unit appears, bare numbers adopt it.
pub fn build_interpolator(
    property: StyleProperty,
    map: &NormalizedKeyframeMap,
) -> Option<PropertyInterpolator> {
    let mut stops: Vec<(f64, StyleValue)> = Vec::new();
    let mut reference: Option<StyleValue> = None;

    for (progress, style) in map.iter() {
        let Some(value) = style.get(property).copied() else {
            continue;
        };
        match reference {
            None => reference = Some(value),
            Some(kind) if kind.is_compatible(&value) => {
                if kind.unit().is_none() && value.unit().is_some() {
                    reference = Some(value);
                }
            }
            Some(kind) => {
                warn!(
                    %property,
                    progress,
                    expected = %kind,
                    ignored = %value,
                    "ignoring keyframe value of incompatible kind"
                );
                continue;
            }
        }
        stops.push((*progress, value));
    }

    let unit = reference.and_then(|value| value.unit());
    if let Some(unit) = unit {
        adopt_unit(&mut stops, unit);
    }

    if stops.is_empty() {
        return None;
    }
    if stops.len() == 1 {
        let (at, value) = stops[0];
        stops.push((at + 1.0, value));
    }
    Some(PropertyInterpolator {
        property,
        stops,
        easing: Easing::default(),
    })
}

fn adopt_unit(stops: &mut [(f64, StyleValue)], unit: Unit) {
    for (_, value) in stops.iter_mut() {
        if let StyleValue::Number(v) = *value {
            *value = StyleValue::Dimension(v, unit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Axis, Rect};
    use crate::core::keyframes::KeyframeOffsets;
    use crate::core::layout::Layout;
    use crate::core::style::StyleSet;

    fn map(offsets: KeyframeOffsets) -> NormalizedKeyframeMap {
        let layout = Layout::new(
            Axis::Y,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(0.0, 0.0, 100.0, 300.0),
            Default::default(),
        );
        NormalizedKeyframeMap::from_offsets(&offsets, &layout)
    }

    fn number(value: StyleValue) -> f64 {
        value.as_number().unwrap()
    }

    #[test]
    fn missing_property_has_no_interpolator() {
        let map = map(KeyframeOffsets::new().at(0.0, StyleSet::new().opacity(0.0)));
        assert!(build_interpolator(StyleProperty::Scale, &map).is_none());
    }

    #[test]
    fn clamps_outside_the_stops() {
        let map = map(
            KeyframeOffsets::new()
                .at(40.0, StyleSet::new().translate_x(10.0))
                .at(160.0, StyleSet::new().translate_x(50.0)),
        );
        let interp = build_interpolator(StyleProperty::TranslateX, &map).unwrap();
        assert_eq!(number(interp.get(0.0)), 10.0);
        assert_eq!(number(interp.get(-3.0)), 10.0);
        assert_eq!(number(interp.get(0.2)), 10.0);
        assert_eq!(number(interp.get(0.8)), 50.0);
        assert_eq!(number(interp.get(7.0)), 50.0);
        assert_eq!(number(interp.get(f64::NAN)), 10.0);
    }

    #[test]
    fn values_between_stops_lie_strictly_between() {
        let map = map(
            KeyframeOffsets::new()
                .at(0.0, StyleSet::new().opacity(0.0))
                .at(100.0, StyleSet::new().opacity(1.0))
                .at(200.0, StyleSet::new().opacity(0.0)),
        );
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            let interp = build_interpolator(StyleProperty::Opacity, &map)
                .unwrap()
                .with_easing(easing);
            for p in [0.05, 0.2, 0.45] {
                let v = number(interp.get(p));
                assert!(v > 0.0 && v < 1.0, "{easing} at {p} gave {v}");
            }
            for p in [0.55, 0.8, 0.95] {
                let v = number(interp.get(p));
                assert!(v > 0.0 && v < 1.0, "{easing} at {p} gave {v}");
            }
        }
    }

    #[test]
    fn linear_midpoint() {
        let map = map(
            KeyframeOffsets::new()
                .at(0.0, StyleSet::new().opacity(0.0))
                .at(200.0, StyleSet::new().opacity(1.0)),
        );
        let interp = build_interpolator(StyleProperty::Opacity, &map).unwrap();
        assert_eq!(number(interp.get(0.5)), 0.5);
        assert_eq!(interp.get(0.5), interp.get(0.5));
    }

    #[test]
    fn single_stop_is_constant() {
        let map = map(KeyframeOffsets::new().at(100.0, StyleSet::new().scale(1.5)));
        let interp = build_interpolator(StyleProperty::Scale, &map).unwrap();
        assert_eq!(interp.stops().len(), 2);
        for p in [0.0, 0.25, 0.5, 0.75, 1.0] {
            assert_eq!(number(interp.get(p)), 1.5);
        }
    }

    #[test]
    fn incompatible_values_are_ignored() {
        let map = map(
            KeyframeOffsets::new()
                .at(0.0, StyleSet::new().translate_y(StyleValue::px(0.0)))
                .at(100.0, StyleSet::new().translate_y(StyleValue::rgb(255, 0, 0)))
                .at(150.0, StyleSet::new().translate_y(StyleValue::percent(50.0)))
                .at(200.0, StyleSet::new().translate_y(StyleValue::px(100.0))),
        );
        let interp = build_interpolator(StyleProperty::TranslateY, &map).unwrap();
        assert_eq!(interp.stops().len(), 2);
        assert_eq!(interp.get(0.5), StyleValue::px(50.0));
    }

    #[test]
    fn bare_numbers_adopt_the_unit() {
        let map = map(
            KeyframeOffsets::new()
                .at(0.0, StyleSet::new().rotate_z(0.0))
                .at(200.0, StyleSet::new().rotate_z(StyleValue::Dimension(1.0, Unit::Turn))),
        );
        let interp = build_interpolator(StyleProperty::RotateZ, &map).unwrap();
        assert_eq!(interp.get(0.0), StyleValue::Dimension(0.0, Unit::Turn));
        assert_eq!(interp.get(0.5), StyleValue::Dimension(0.5, Unit::Turn));
    }

    #[test]
    fn colours_interpolate() {
        let map = map(
            KeyframeOffsets::new()
                .at(0.0, StyleSet::new().color(StyleValue::rgb(0, 0, 0)))
                .at(200.0, StyleSet::new().color(StyleValue::rgb(255, 255, 255))),
        );
        let interp = build_interpolator(StyleProperty::Color, &map).unwrap();
        let mid = interp.get(0.5).as_color().unwrap();
        assert!(mid.red > 0.0 && mid.red < 1.0);
        assert_eq!(interp.get(1.0), StyleValue::rgb(255, 255, 255));
    }

    #[test]
    fn easing_parses_from_css_names() {
        assert_eq!("ease-in-out".parse::<Easing>().unwrap(), Easing::EaseInOut);
        assert_eq!("Linear".parse::<Easing>().unwrap(), Easing::Linear);
        assert!("bounce".parse::<Easing>().is_err());
    }

    #[test]
    fn easing_cycle_wraps() {
        let mut easing = Easing::Linear;
        for _ in 0..Easing::ALL.len() {
            easing = easing.next();
        }
        assert_eq!(easing, Easing::Linear);
        assert_eq!(Easing::EaseIn.next(), Easing::EaseOut);
    }
}
