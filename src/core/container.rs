//! Scroll containers and the section handles that live inside them.

use std::fmt;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use super::clock::{Clock, SystemClock};
use super::geometry::{Axis, Rect, SectionGeometry};
use super::layout::{Layout, LayoutManager, SectionId};
use super::scroll::ScrollStream;
use crate::error::{Error, Result};

/// Update interval used by animators unless told otherwise.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(90);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerOptions {
    /// Scroll axis, fixed for the container's lifetime.
    pub axis: Axis,
    /// Minimum interval between animator target updates; zero disables
    /// throttling.
    pub throttle: Duration,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            axis: Axis::Y,
            throttle: DEFAULT_THROTTLE,
        }
    }
}

pub(crate) struct ContainerInner {
    pub(crate) options: ContainerOptions,
    pub(crate) layout: LayoutManager,
    pub(crate) scroll: ScrollStream,
    pub(crate) clock: Rc<dyn Clock>,
}

/// A scrollable viewport: axis, layout authority, scroll stream and clock.
///
/// Cloning shares the container.
#[derive(Clone)]
pub struct ScrollContainer {
    inner: Rc<ContainerInner>,
}

impl ScrollContainer {
    pub fn new(options: ContainerOptions) -> Self {
        Self::with_clock(options, Rc::new(SystemClock))
    }

    pub fn with_clock(options: ContainerOptions, clock: Rc<dyn Clock>) -> Self {
        Self {
            inner: Rc::new(ContainerInner {
                options,
                layout: LayoutManager::new(options.axis),
                scroll: ScrollStream::new(),
                clock,
            }),
        }
    }

    pub fn axis(&self) -> Axis {
        self.inner.options.axis
    }

    pub fn throttle(&self) -> Duration {
        self.inner.options.throttle
    }

    pub fn layout_manager(&self) -> &LayoutManager {
        &self.inner.layout
    }

    pub fn layout(&self) -> Rc<Layout> {
        self.inner.layout.layout()
    }

    pub fn scroll(&self) -> &ScrollStream {
        &self.inner.scroll
    }

    pub fn now(&self) -> Instant {
        self.inner.clock.now()
    }

    pub fn clock(&self) -> Rc<dyn Clock> {
        Rc::clone(&self.inner.clock)
    }

    pub fn set_container_rect(&self, rect: Rect) {
        self.inner.layout.set_container_rect(rect);
    }

    pub fn set_content_rect(&self, rect: Rect) {
        self.inner.layout.set_content_rect(rect);
    }

    /// Handle for section `id`.  The section becomes ready once its rect is
    /// measured.
    pub fn section(&self, id: impl Into<SectionId>) -> Section {
        Section {
            id: id.into(),
            container: Rc::downgrade(&self.inner),
        }
    }

    /// Measure a section and hand back its handle.
    pub fn add_section(&self, id: impl Into<SectionId>, rect: Rect) -> Section {
        let section = self.section(id);
        self.inner.layout.set_section_rect(section.id.clone(), rect);
        section
    }

    /// Record a scroll position on the container's axis at the current time.
    pub fn scroll_to(&self, position: f64) {
        self.inner
            .scroll
            .record(self.axis(), position, self.inner.clock.now());
    }

    pub fn position(&self) -> f64 {
        self.inner.scroll.position(self.axis())
    }

    pub fn velocity(&self) -> f64 {
        self.inner.scroll.velocity(self.axis())
    }

    /// Current scroll progress; see [`Layout::progress`].
    pub fn progress(&self) -> f64 {
        self.layout().progress(self.position())
    }

    /// Step the scroll velocity smoothing to the clock's current time.
    pub fn tick(&self) {
        self.inner.scroll.tick(self.inner.clock.now());
    }
}

impl fmt::Debug for ScrollContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollContainer")
            .field("options", &self.inner.options)
            .field("layout", &self.inner.layout)
            .finish_non_exhaustive()
    }
}

// ───────────────────────────────────────── section ───────────

/// A section inside a [`ScrollContainer`].
///
/// The handle does not keep its container alive.  Every call that needs the
/// container fails with [`Error::ContainerDropped`] once it is gone.
#[derive(Clone)]
pub struct Section {
    id: SectionId,
    container: Weak<ContainerInner>,
}

impl Section {
    pub fn id(&self) -> &SectionId {
        &self.id
    }

    pub fn container(&self) -> Result<ScrollContainer> {
        self.container
            .upgrade()
            .map(|inner| ScrollContainer { inner })
            .ok_or_else(|| Error::ContainerDropped(self.id.clone()))
    }

    /// Whether the section is measured and its container has a size.
    pub fn is_ready(&self) -> Result<bool> {
        Ok(self.container()?.layout().is_section_ready(&self.id))
    }

    pub fn geometry(&self) -> Result<Option<SectionGeometry>> {
        Ok(self.container()?.layout().section_geometry(&self.id))
    }

    pub fn set_rect(&self, rect: Rect) -> Result<()> {
        self.container()?
            .layout_manager()
            .set_section_rect(self.id.clone(), rect);
        Ok(())
    }

    /// Forget the section's measurement; it stops being ready.
    pub fn remove(&self) -> Result<()> {
        self.container()?.layout_manager().remove_section(&self.id);
        Ok(())
    }
}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("id", &self.id)
            .field("attached", &(self.container.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;

    #[test]
    fn sections_become_ready_once_measured() {
        let container = ScrollContainer::new(ContainerOptions::default());
        let section = container.section("intro");
        assert!(!section.is_ready().unwrap());

        container.set_container_rect(Rect::new(0.0, 0.0, 80.0, 24.0));
        section.set_rect(Rect::new(0.0, 0.0, 80.0, 30.0)).unwrap();
        assert!(section.is_ready().unwrap());

        section.remove().unwrap();
        assert!(!section.is_ready().unwrap());
    }

    #[test]
    fn dropped_container_is_a_usage_error() {
        let section = {
            let container = ScrollContainer::new(ContainerOptions::default());
            container.add_section("orphan", Rect::new(0.0, 0.0, 1.0, 1.0))
        };
        assert!(matches!(section.is_ready(), Err(Error::ContainerDropped(_))));
    }

    #[test]
    fn scroll_follows_the_container_axis() {
        let clock = Rc::new(ManualClock::new());
        let options = ContainerOptions {
            axis: Axis::X,
            ..ContainerOptions::default()
        };
        let container = ScrollContainer::with_clock(options, clock);
        container.set_container_rect(Rect::new(0.0, 0.0, 100.0, 50.0));
        container.set_content_rect(Rect::new(0.0, 0.0, 500.0, 50.0));
        container.scroll_to(200.0);
        assert_eq!(container.scroll().position(Axis::X), 200.0);
        assert_eq!(container.scroll().position(Axis::Y), 0.0);
        assert_eq!(container.progress(), 0.5);
    }
}
