//! Rectangles, scroll axes and the read-only geometry views keyframe authors
//! query ("where is this section's top when it sits at the container's
//! center?").
//!
//! All queries return absolute scroll positions, not normalised progress.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;

// ───────────────────────────────────────── rect ──────────────

/// Axis-aligned box in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Leading edge along `axis`.
    pub fn start(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Size along `axis`.
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }
}

// ───────────────────────────────────────── axis ──────────────

/// Scroll axis of a container.  Fixed for the container's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    #[default]
    Y,
}

impl Axis {
    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" | "horizontal" => Ok(Axis::X),
            "y" | "vertical" => Ok(Axis::Y),
            _ => Err(Error::InvalidAxis(s.to_string())),
        }
    }
}

// ───────────────────────────────────────── anchor ────────────

/// Where along the container an edge query is anchored.
///
/// `Start` is the container's top (y) or left (x) edge, `End` its bottom or
/// right edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Start,
    Center,
    End,
}

impl Anchor {
    /// Offset subtracted from a section edge for a container of `extent`.
    fn offset(self, extent: f64) -> f64 {
        match self {
            Anchor::Start => 0.0,
            Anchor::Center => extent / 2.0,
            Anchor::End => extent,
        }
    }
}

impl FromStr for Anchor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "container-top" | "container-left" | "container-start" => Ok(Anchor::Start),
            "container-center" => Ok(Anchor::Center),
            "container-bottom" | "container-right" | "container-end" => Ok(Anchor::End),
            _ => Err(Error::InvalidAnchor(s.to_string())),
        }
    }
}

// ───────────────────────────────────────── views ─────────────

/// Section rect seen relative to its container.
///
/// `top_at`/`bottom_at` are usable regardless of the active scroll axis, as
/// are `left_at`/`right_at`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionGeometry {
    rect: Rect,
    container: Rect,
}

impl SectionGeometry {
    pub fn new(rect: Rect, container: Rect) -> Self {
        Self { rect, container }
    }

    pub fn x(&self) -> f64 {
        self.rect.x
    }

    pub fn y(&self) -> f64 {
        self.rect.y
    }

    pub fn width(&self) -> f64 {
        self.rect.width
    }

    pub fn height(&self) -> f64 {
        self.rect.height
    }

    /// Scroll position at which the section's top edge sits at `anchor`.
    pub fn top_at(&self, anchor: Anchor) -> f64 {
        self.rect.y - anchor.offset(self.container.height)
    }

    /// Scroll position at which the section's bottom edge sits at `anchor`.
    pub fn bottom_at(&self, anchor: Anchor) -> f64 {
        self.rect.y + self.rect.height - anchor.offset(self.container.height)
    }

    /// Scroll position at which the section's left edge sits at `anchor`.
    pub fn left_at(&self, anchor: Anchor) -> f64 {
        self.rect.x - anchor.offset(self.container.width)
    }

    /// Scroll position at which the section's right edge sits at `anchor`.
    pub fn right_at(&self, anchor: Anchor) -> f64 {
        self.rect.x + self.rect.width - anchor.offset(self.container.width)
    }

    /// Leading-edge query along `axis` (`top_at` for y, `left_at` for x).
    pub fn start_at(&self, axis: Axis, anchor: Anchor) -> f64 {
        match axis {
            Axis::X => self.left_at(anchor),
            Axis::Y => self.top_at(anchor),
        }
    }

    /// Trailing-edge query along `axis` (`bottom_at` for y, `right_at` for x).
    pub fn end_at(&self, axis: Axis, anchor: Anchor) -> f64 {
        match axis {
            Axis::X => self.right_at(anchor),
            Axis::Y => self.bottom_at(anchor),
        }
    }
}

/// The scroll container's own rect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerGeometry {
    rect: Rect,
}

impl ContainerGeometry {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    pub fn x(&self) -> f64 {
        self.rect.x
    }

    pub fn y(&self) -> f64 {
        self.rect.y
    }

    pub fn width(&self) -> f64 {
        self.rect.width
    }

    pub fn height(&self) -> f64 {
        self.rect.height
    }

    pub fn extent(&self, axis: Axis) -> f64 {
        self.rect.extent(axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section() -> SectionGeometry {
        SectionGeometry::new(
            Rect::new(50.0, 1000.0, 400.0, 600.0),
            Rect::new(0.0, 0.0, 800.0, 500.0),
        )
    }

    #[test]
    fn vertical_edges_subtract_container_height() {
        let s = section();
        assert_eq!(s.top_at(Anchor::Start), 1000.0);
        assert_eq!(s.top_at(Anchor::Center), 750.0);
        assert_eq!(s.top_at(Anchor::End), 500.0);
        assert_eq!(s.bottom_at(Anchor::Start), 1600.0);
        assert_eq!(s.bottom_at(Anchor::Center), 1350.0);
        assert_eq!(s.bottom_at(Anchor::End), 1100.0);
    }

    #[test]
    fn horizontal_edges_subtract_container_width() {
        let s = section();
        assert_eq!(s.left_at(Anchor::Start), 50.0);
        assert_eq!(s.left_at(Anchor::Center), -350.0);
        assert_eq!(s.left_at(Anchor::End), -750.0);
        assert_eq!(s.right_at(Anchor::Start), 450.0);
        assert_eq!(s.right_at(Anchor::End), -350.0);
    }

    #[test]
    fn axis_helpers_pick_matching_edge() {
        let s = section();
        assert_eq!(s.start_at(Axis::Y, Anchor::Center), s.top_at(Anchor::Center));
        assert_eq!(s.end_at(Axis::X, Anchor::End), s.right_at(Anchor::End));
    }

    #[test]
    fn anchors_parse_from_container_edge_names() {
        assert_eq!("container-top".parse::<Anchor>().unwrap(), Anchor::Start);
        assert_eq!("container-right".parse::<Anchor>().unwrap(), Anchor::End);
        assert_eq!("container-center".parse::<Anchor>().unwrap(), Anchor::Center);
        assert!(matches!(
            "middle".parse::<Anchor>(),
            Err(Error::InvalidAnchor(_))
        ));
    }

    #[test]
    fn axis_parses_case_insensitively() {
        assert_eq!("X".parse::<Axis>().unwrap(), Axis::X);
        assert_eq!(" y ".parse::<Axis>().unwrap(), Axis::Y);
        assert!("z".parse::<Axis>().is_err());
    }
}
