//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! Widgets draw a [`SceneFrame`](crate::app::scene::SceneFrame) snapshot;
//! none of them talk to the engine directly.

pub mod layout;
pub mod readout;
pub mod smooth_scroll;
pub mod stage;
pub mod theme;
