//! Animatable style properties and their values.
//!
//! A value is a bare number, a number with a CSS unit, or a colour.  Numbers
//! and dimensions interpolate arithmetically; colours interpolate per channel
//! in linear light.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use palette::{LinSrgba, Mix, Srgb, Srgba};
use serde::Deserialize;

use crate::error::Error;

// ───────────────────────────────────────── properties ────────

/// Every property the animator can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleProperty {
    TranslateX,
    TranslateY,
    TranslateZ,
    Scale,
    ScaleX,
    ScaleY,
    ScaleZ,
    RotateX,
    RotateY,
    RotateZ,
    SkewX,
    SkewY,
    Opacity,
    Color,
    BackgroundColor,
}

/// Groups of properties that share spring defaults and identity values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyFamily {
    Translate,
    Rotate,
    Scale,
    Skew,
    Opacity,
    Color,
}

impl StyleProperty {
    /// All properties, in CSS transform order followed by opacity and colours.
    pub const ALL: &'static [StyleProperty] = &[
        StyleProperty::TranslateX,
        StyleProperty::TranslateY,
        StyleProperty::TranslateZ,
        StyleProperty::Scale,
        StyleProperty::ScaleX,
        StyleProperty::ScaleY,
        StyleProperty::ScaleZ,
        StyleProperty::RotateX,
        StyleProperty::RotateY,
        StyleProperty::RotateZ,
        StyleProperty::SkewX,
        StyleProperty::SkewY,
        StyleProperty::Opacity,
        StyleProperty::Color,
        StyleProperty::BackgroundColor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StyleProperty::TranslateX => "translateX",
            StyleProperty::TranslateY => "translateY",
            StyleProperty::TranslateZ => "translateZ",
            StyleProperty::Scale => "scale",
            StyleProperty::ScaleX => "scaleX",
            StyleProperty::ScaleY => "scaleY",
            StyleProperty::ScaleZ => "scaleZ",
            StyleProperty::RotateX => "rotateX",
            StyleProperty::RotateY => "rotateY",
            StyleProperty::RotateZ => "rotateZ",
            StyleProperty::SkewX => "skewX",
            StyleProperty::SkewY => "skewY",
            StyleProperty::Opacity => "opacity",
            StyleProperty::Color => "color",
            StyleProperty::BackgroundColor => "backgroundColor",
        }
    }

    pub fn family(self) -> PropertyFamily {
        use StyleProperty::*;
        match self {
            TranslateX | TranslateY | TranslateZ => PropertyFamily::Translate,
            Scale | ScaleX | ScaleY | ScaleZ => PropertyFamily::Scale,
            RotateX | RotateY | RotateZ => PropertyFamily::Rotate,
            SkewX | SkewY => PropertyFamily::Skew,
            Opacity => PropertyFamily::Opacity,
            Color | BackgroundColor => PropertyFamily::Color,
        }
    }

    /// Value the property holds when no keyframe mentions it.  Colours have
    /// no identity and stay unset.
    pub fn identity(self) -> Option<StyleValue> {
        match self.family() {
            PropertyFamily::Translate | PropertyFamily::Rotate | PropertyFamily::Skew => {
                Some(StyleValue::Number(0.0))
            }
            PropertyFamily::Scale | PropertyFamily::Opacity => Some(StyleValue::Number(1.0)),
            PropertyFamily::Color => None,
        }
    }

    /// Unit a bare number implies when rendered as CSS.
    pub fn default_unit(self) -> Option<Unit> {
        match self.family() {
            PropertyFamily::Translate => Some(Unit::Px),
            PropertyFamily::Rotate | PropertyFamily::Skew => Some(Unit::Deg),
            _ => None,
        }
    }

    pub fn is_transform(self) -> bool {
        !matches!(
            self.family(),
            PropertyFamily::Opacity | PropertyFamily::Color
        )
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StyleProperty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        StyleProperty::ALL
            .iter()
            .copied()
            .find(|p| p.name() == wanted)
            .or(match wanted {
                "background-color" => Some(StyleProperty::BackgroundColor),
                _ => None,
            })
            .ok_or_else(|| Error::UnknownProperty(s.to_string()))
    }
}

// ───────────────────────────────────────── units ─────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Px,
    Percent,
    Deg,
    Rad,
    Turn,
    Em,
    Rem,
    Vw,
    Vh,
}

impl Unit {
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Percent => "%",
            Unit::Deg => "deg",
            Unit::Rad => "rad",
            Unit::Turn => "turn",
            Unit::Em => "em",
            Unit::Rem => "rem",
            Unit::Vw => "vw",
            Unit::Vh => "vh",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix.to_ascii_lowercase().as_str() {
            "px" => Unit::Px,
            "%" => Unit::Percent,
            "deg" => Unit::Deg,
            "rad" => Unit::Rad,
            "turn" => Unit::Turn,
            "em" => Unit::Em,
            "rem" => Unit::Rem,
            "vw" => Unit::Vw,
            "vh" => Unit::Vh,
            _ => return None,
        })
    }
}

// ───────────────────────────────────────── values ────────────

/// A single property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleValue {
    Number(f64),
    Dimension(f64, Unit),
    Color(Srgba),
}

impl StyleValue {
    pub fn px(value: f64) -> Self {
        StyleValue::Dimension(value, Unit::Px)
    }

    pub fn deg(value: f64) -> Self {
        StyleValue::Dimension(value, Unit::Deg)
    }

    pub fn percent(value: f64) -> Self {
        StyleValue::Dimension(value, Unit::Percent)
    }

    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    pub fn rgba(red: u8, green: u8, blue: u8, alpha: f32) -> Self {
        let rgb: Srgb = Srgb::new(red, green, blue).into_format();
        StyleValue::Color(Srgba::new(rgb.red, rgb.green, rgb.blue, alpha.clamp(0.0, 1.0)))
    }

    /// Numeric magnitude, ignoring any unit.  `None` for colours.
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            StyleValue::Number(v) | StyleValue::Dimension(v, _) => Some(v),
            StyleValue::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Srgba> {
        match *self {
            StyleValue::Color(c) => Some(c),
            _ => None,
        }
    }

    pub fn unit(&self) -> Option<Unit> {
        match *self {
            StyleValue::Dimension(_, unit) => Some(unit),
            _ => None,
        }
    }

    pub fn is_color(&self) -> bool {
        matches!(self, StyleValue::Color(_))
    }

    /// Whether the two values can be interpolated.  Bare numbers combine with
    /// any unit; dimensions need the same unit; colours only mix with colours.
    pub fn is_compatible(&self, other: &StyleValue) -> bool {
        match (self, other) {
            (StyleValue::Color(_), StyleValue::Color(_)) => true,
            (StyleValue::Color(_), _) | (_, StyleValue::Color(_)) => false,
            _ => match (self.unit(), other.unit()) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            },
        }
    }

    /// Interpolate towards `to` by `t`.  Incompatible values step to `to`
    /// once `t` reaches 1.
    pub fn lerp(&self, to: &StyleValue, t: f64) -> StyleValue {
        if !self.is_compatible(to) {
            return if t >= 1.0 { *to } else { *self };
        }
        match (*self, *to) {
            (StyleValue::Color(_), StyleValue::Color(_)) if t <= 0.0 => *self,
            (StyleValue::Color(_), StyleValue::Color(_)) if t >= 1.0 => *to,
            (StyleValue::Color(a), StyleValue::Color(b)) => {
                StyleValue::Color(mix_colors(a, b, t as f32))
            }
            _ => {
                let a = self.as_number().unwrap_or(0.0);
                let b = to.as_number().unwrap_or(0.0);
                let v = if t >= 1.0 { b } else { a + (b - a) * t };
                match self.unit().or(to.unit()) {
                    Some(unit) => StyleValue::Dimension(v, unit),
                    None => StyleValue::Number(v),
                }
            }
        }
    }

    /// Scalar channels used by the spring smoother: one for numbers, four
    /// (r, g, b, a in 0..=1) for colours.
    pub(crate) fn components(&self) -> Vec<f64> {
        match *self {
            StyleValue::Number(v) | StyleValue::Dimension(v, _) => vec![v],
            StyleValue::Color(c) => vec![
                c.red as f64,
                c.green as f64,
                c.blue as f64,
                c.alpha as f64,
            ],
        }
    }

    /// Rebuild a value of the same kind and unit from spring channels.
    pub(crate) fn with_components(&self, channels: &[f64]) -> StyleValue {
        let channel = |i: usize| channels.get(i).copied().unwrap_or(0.0);
        match *self {
            StyleValue::Number(_) => StyleValue::Number(channel(0)),
            StyleValue::Dimension(_, unit) => StyleValue::Dimension(channel(0), unit),
            StyleValue::Color(_) => {
                let c = |i: usize| channel(i).clamp(0.0, 1.0) as f32;
                StyleValue::Color(Srgba::new(c(0), c(1), c(2), c(3)))
            }
        }
    }

    /// CSS text, with bare numbers given `property`'s default unit.
    pub fn to_css_for(&self, property: StyleProperty) -> String {
        match (*self, property.default_unit()) {
            (StyleValue::Number(v), Some(unit)) => {
                format!("{}{}", format_number(v), unit.suffix())
            }
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StyleValue::Number(v) => f.write_str(&format_number(v)),
            StyleValue::Dimension(v, unit) => write!(f, "{}{}", format_number(v), unit.suffix()),
            StyleValue::Color(c) => {
                let rgb: Srgb<u8> = Srgb::new(c.red, c.green, c.blue).into_format();
                write!(
                    f,
                    "rgba({}, {}, {}, {})",
                    rgb.red,
                    rgb.green,
                    rgb.blue,
                    format_number(c.alpha as f64)
                )
            }
        }
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Number(value as f64)
    }
}

impl From<Srgba> for StyleValue {
    fn from(color: Srgba) -> Self {
        StyleValue::Color(color)
    }
}

impl FromStr for StyleValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || Error::InvalidValue(s.to_string());

        if text.starts_with('#') {
            return parse_hex(text).map(StyleValue::Color).ok_or_else(invalid);
        }
        let lower = text.to_ascii_lowercase();
        if lower.starts_with("rgb") {
            return parse_rgb_function(&lower)
                .map(StyleValue::Color)
                .ok_or_else(invalid);
        }
        if let Ok(v) = text.parse::<f64>() {
            return Ok(StyleValue::Number(v));
        }
        if let Some(split) = text.rfind(|c: char| c.is_ascii_digit() || c == '.') {
            let (number, suffix) = text.split_at(split + 1);
            if let (Ok(v), Some(unit)) = (number.parse::<f64>(), Unit::from_suffix(suffix)) {
                return Ok(StyleValue::Dimension(v, unit));
            }
        }
        palette::named::from_str(&lower)
            .map(|rgb| {
                let rgb: Srgb = rgb.into_format();
                StyleValue::Color(Srgba::new(rgb.red, rgb.green, rgb.blue, 1.0))
            })
            .ok_or_else(invalid)
    }
}

fn format_number(v: f64) -> String {
    let text = format!("{v:.4}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

fn mix_colors(from: Srgba, to: Srgba, t: f32) -> Srgba {
    let a: LinSrgba = from.into_linear();
    let b: LinSrgba = to.into_linear();
    Srgba::from_linear(a.mix(b, t.clamp(0.0, 1.0)))
}

/// `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
fn parse_hex(text: &str) -> Option<Srgba> {
    let digits = text.strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    let (rgb, alpha) = match digits.len() {
        3 | 6 => (digits, None),
        4 => (&digits[..3], Some(digits[3..].repeat(2))),
        8 => (&digits[..6], Some(digits[6..].to_string())),
        _ => return None,
    };
    let alpha = match alpha {
        Some(hex) => u8::from_str_radix(&hex, 16).ok()? as f32 / 255.0,
        None => 1.0,
    };
    let rgb: Srgb<u8> = rgb.parse().ok()?;
    let rgb: Srgb = rgb.into_format();
    Some(Srgba::new(rgb.red, rgb.green, rgb.blue, alpha))
}

/// `rgb(r, g, b)` / `rgba(r, g, b, a)`, also space- and slash-separated.
fn parse_rgb_function(text: &str) -> Option<Srgba> {
    let open = text.find('(')?;
    let body = text[open + 1..].strip_suffix(')')?;
    let parts: Vec<&str> = body
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |p: &str| -> Option<f32> {
        match p.strip_suffix('%') {
            Some(pct) => Some(pct.parse::<f32>().ok()? / 100.0),
            None => Some(p.parse::<f32>().ok()? / 255.0),
        }
        .map(|v| v.clamp(0.0, 1.0))
    };
    let alpha = match parts.get(3) {
        Some(p) => match p.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? / 100.0,
            None => p.parse::<f32>().ok()?,
        },
        None => 1.0,
    };
    Some(Srgba::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha.clamp(0.0, 1.0),
    ))
}

// ───────────────────────────────────────── style sets ────────

/// A partial set of property values, as written in one keyframe or produced
/// by one animation frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSet {
    values: BTreeMap<StyleProperty, StyleValue>,
}

macro_rules! style_setters {
    ($($method:ident => $property:ident),* $(,)?) => {
        $(
            pub fn $method(self, value: impl Into<StyleValue>) -> Self {
                self.with(StyleProperty::$property, value)
            }
        )*
    };
}

impl StyleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: StyleProperty, value: impl Into<StyleValue>) -> Self {
        self.insert(property, value);
        self
    }

    style_setters! {
        translate_x => TranslateX,
        translate_y => TranslateY,
        translate_z => TranslateZ,
        scale => Scale,
        scale_x => ScaleX,
        scale_y => ScaleY,
        scale_z => ScaleZ,
        rotate_x => RotateX,
        rotate_y => RotateY,
        rotate_z => RotateZ,
        skew_x => SkewX,
        skew_y => SkewY,
        opacity => Opacity,
        color => Color,
        background_color => BackgroundColor,
    }

    pub fn insert(&mut self, property: StyleProperty, value: impl Into<StyleValue>) {
        self.values.insert(property, value.into());
    }

    pub fn get(&self, property: StyleProperty) -> Option<&StyleValue> {
        self.values.get(&property)
    }

    pub fn contains(&self, property: StyleProperty) -> bool {
        self.values.contains_key(&property)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StyleProperty, &StyleValue)> {
        self.values.iter().map(|(p, v)| (*p, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy every value from `other` over this set.
    pub fn merge(&mut self, other: &StyleSet) {
        for (property, value) in other.iter() {
            self.values.insert(property, *value);
        }
    }

    /// CSS `transform` text for the transform properties in this set, in
    /// translate → scale → rotate → skew order.  Identity values are left out.
    pub fn to_css_transform(&self) -> String {
        let parts: Vec<String> = self
            .iter()
            .filter(|(p, v)| p.is_transform() && p.identity().as_ref() != Some(*v))
            .map(|(p, v)| format!("{}({})", p.name(), v.to_css_for(p)))
            .collect();
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(" ")
        }
    }
}

impl FromIterator<(StyleProperty, StyleValue)> for StyleSet {
    fn from_iter<I: IntoIterator<Item = (StyleProperty, StyleValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
