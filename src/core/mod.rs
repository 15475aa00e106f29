//! The scroll animation engine: layout snapshots, scroll streams, keyframe
//! resolution, interpolation and springs.
//!
//! Nothing in this module depends on any TUI or rendering crate.  Handles
//! are single-threaded (`Rc`-based); a host drives them from one loop.

pub mod animator;
pub mod clock;
pub mod container;
pub mod geometry;
pub mod interpolate;
pub mod keyframes;
pub mod layout;
pub mod scroll;
pub mod scroll_state;
pub mod signal;
pub mod spring;
pub mod style;
pub mod throttle;
