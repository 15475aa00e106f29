//! Central demo state.
//!
//! All mutable state lives here so that rendering reads `&DemoState` and
//! input handling mutates `&mut DemoState`.

use super::keys::Bindings;

use crate::ui::smooth_scroll::SmoothScroll;

use super::scene::Scene;

/// Fraction of the remaining scroll distance covered each frame.
const SCROLL_EASE: f64 = 0.25;

pub struct DemoState {
    pub scene: Scene,
    /// Eased scroll position fed into the scene each frame.
    pub smooth: SmoothScroll,
    pub bindings: Bindings,
    /// Cells moved per key press or wheel notch.
    pub scroll_step: f64,
    /// Cells moved per page; tracks the viewport size.
    pub page_size: f64,
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
}

impl DemoState {
    pub fn new(scene: Scene, bindings: Bindings, scroll_step: u16) -> Self {
        Self {
            scene,
            smooth: SmoothScroll::new(SCROLL_EASE),
            bindings,
            scroll_step: f64::from(scroll_step.max(1)),
            page_size: 10.0,
            should_quit: false,
            status_message: None,
        }
    }

    /// Move the scroll target by `delta` cells.
    pub fn scroll_by(&mut self, delta: f64) {
        let max = self.scene.max_scroll_position();
        self.smooth.nudge(delta, max);
    }

    pub fn scroll_to(&mut self, target: f64) {
        let max = self.scene.max_scroll_position();
        self.smooth.set_target(target, max);
    }

    /// Re-measure the scene for a viewport of `width` × `height` cells.
    pub fn resize(&mut self, width: u16, height: u16) -> scroll_keyframes::Result<()> {
        self.scene.layout(f64::from(width), f64::from(height))?;
        self.page_size = match self.scene.axis() {
            scroll_keyframes::Axis::Y => f64::from(height),
            scroll_keyframes::Axis::X => f64::from(width),
        }
        .max(1.0);
        self.smooth.clamp_to(self.scene.max_scroll_position());
        Ok(())
    }

    /// Advance one frame: ease the scroll position, feed it to the scene and
    /// step every animator.  Returns whether anything is still moving.
    pub fn advance(&mut self) -> bool {
        let scrolled = self.smooth.tick();
        if scrolled {
            self.scene.scroll_to(self.smooth.position());
        }
        let animating = self.scene.tick();
        scrolled || animating || self.smooth.is_animating()
    }
}
