//! Scroll-driven keyframe animation.
//!
//! A [`ScrollContainer`] owns the measured layout and the live scroll
//! stream.  Sections inside it feed [`ItemAnimator`]s, which resolve
//! keyframes against the layout, interpolate per property at the current
//! scroll progress and smooth the result with springs.  [`scroll_state`]
//! and [`scroll_value`] derive arbitrary values from the same inputs.

pub mod config;
pub mod core;
pub mod error;

pub use crate::core::animator::{AnimatorOptions, ItemAnimator};
pub use crate::core::clock::{Clock, ManualClock, SystemClock};
pub use crate::core::container::{ContainerOptions, ScrollContainer, Section};
pub use crate::core::geometry::{Anchor, Axis, ContainerGeometry, Rect, SectionGeometry};
pub use crate::core::interpolate::Easing;
pub use crate::core::keyframes::{KeyframeOffsets, Keyframes, KeyframesContext};
pub use crate::core::layout::{Layout, SectionId};
pub use crate::core::scroll_state::{scroll_state, scroll_value, ScrollContext, ScrollState, ScrollValue};
pub use crate::core::spring::{SpringConfig, SpringOverride};
pub use crate::core::style::{StyleProperty, StyleSet, StyleValue, Unit};
pub use crate::error::{Error, Result};
