//! Layout snapshot and the authority that publishes it.
//!
//! Every update builds a fresh [`Layout`] and publishes it wholesale, so a
//! reader holding an `Rc<Layout>` never sees a half-applied change.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::geometry::{Axis, ContainerGeometry, Rect, SectionGeometry};
use super::signal::{Signal, Subscription};

// ───────────────────────────────────────── section id ────────

/// Identifier of a section within one container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ───────────────────────────────────────── snapshot ──────────

/// Immutable layout snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    pub container: Rect,
    pub content: Rect,
    pub sections: HashMap<SectionId, Rect>,
    /// Content extent minus container extent along the scroll axis.  May be
    /// zero or negative when the content fits inside the container.
    pub max_scroll_position: f64,
}

impl Layout {
    pub fn new(
        axis: Axis,
        container: Rect,
        content: Rect,
        sections: HashMap<SectionId, Rect>,
    ) -> Self {
        Self {
            container,
            content,
            sections,
            max_scroll_position: content.extent(axis) - container.extent(axis),
        }
    }

    pub fn section(&self, id: &SectionId) -> Option<Rect> {
        self.sections.get(id).copied()
    }

    /// A section is ready once it has been measured and the container has a
    /// nonzero size.
    pub fn is_section_ready(&self, id: &SectionId) -> bool {
        self.sections.contains_key(id) && self.container.width != 0.0 && self.container.height != 0.0
    }

    pub fn section_geometry(&self, id: &SectionId) -> Option<SectionGeometry> {
        self.section(id)
            .map(|rect| SectionGeometry::new(rect, self.container))
    }

    pub fn container_geometry(&self) -> ContainerGeometry {
        ContainerGeometry::new(self.container)
    }

    /// Whether there is anything to scroll through.
    pub fn has_scroll_range(&self) -> bool {
        self.max_scroll_position.is_finite() && self.max_scroll_position > 0.0
    }

    /// Normalise a scroll position (or keyframe offset) to progress.
    ///
    /// Without a positive scroll range every position maps to `0`.
    /// Non-finite positions also map to `0`.  The result is not clamped.
    pub fn progress(&self, position: f64) -> f64 {
        if !self.has_scroll_range() || !position.is_finite() {
            return 0.0;
        }
        position / self.max_scroll_position
    }
}

// ───────────────────────────────────────── authority ─────────

/// Owns the current [`Layout`] and republishes it on every measured change.
///
/// Hosts call the `set_*` methods from their resize plumbing; the engine only
/// reads and subscribes.
#[derive(Debug, Clone)]
pub struct LayoutManager {
    axis: Axis,
    snapshot: Signal<Rc<Layout>>,
}

impl LayoutManager {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            snapshot: Signal::new(Rc::new(Layout::new(
                axis,
                Rect::ZERO,
                Rect::ZERO,
                HashMap::new(),
            ))),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Current snapshot.
    pub fn layout(&self) -> Rc<Layout> {
        self.snapshot.get()
    }

    pub fn set_container_rect(&self, rect: Rect) {
        self.replace(|container, _, _| *container = rect);
    }

    pub fn set_content_rect(&self, rect: Rect) {
        self.replace(|_, content, _| *content = rect);
    }

    pub fn set_section_rect(&self, id: impl Into<SectionId>, rect: Rect) {
        let id = id.into();
        self.replace(move |_, _, sections| {
            sections.insert(id, rect);
        });
    }

    pub fn remove_section(&self, id: &SectionId) {
        self.replace(|_, _, sections| {
            sections.remove(id);
        });
    }

    /// Run `subscriber` with every newly published snapshot.
    pub fn subscribe(&self, subscriber: impl Fn(&Rc<Layout>) + 'static) -> Subscription {
        self.snapshot.subscribe(subscriber)
    }

    pub fn subscriber_count(&self) -> usize {
        self.snapshot.subscriber_count()
    }

    fn replace(&self, edit: impl FnOnce(&mut Rect, &mut Rect, &mut HashMap<SectionId, Rect>)) {
        let current = self.layout();
        let mut container = current.container;
        let mut content = current.content;
        let mut sections = current.sections.clone();
        edit(&mut container, &mut content, &mut sections);
        // Signal::set drops the update when nothing actually changed.
        self.snapshot
            .set(Rc::new(Layout::new(self.axis, container, content, sections)));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn max_scroll_follows_active_axis() {
        let vertical = LayoutManager::new(Axis::Y);
        vertical.set_container_rect(Rect::new(0.0, 0.0, 800.0, 600.0));
        vertical.set_content_rect(Rect::new(0.0, 0.0, 1200.0, 2000.0));
        assert_eq!(vertical.layout().max_scroll_position, 1400.0);

        let horizontal = LayoutManager::new(Axis::X);
        horizontal.set_container_rect(Rect::new(0.0, 0.0, 800.0, 600.0));
        horizontal.set_content_rect(Rect::new(0.0, 0.0, 1200.0, 2000.0));
        assert_eq!(horizontal.layout().max_scroll_position, 400.0);
    }

    #[test]
    fn readiness_needs_section_rect_and_sized_container() {
        let manager = LayoutManager::new(Axis::Y);
        let id = SectionId::new("intro");
        assert!(!manager.layout().is_section_ready(&id));

        manager.set_section_rect(id.clone(), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(!manager.layout().is_section_ready(&id));

        manager.set_container_rect(Rect::new(0.0, 0.0, 100.0, 0.0));
        assert!(!manager.layout().is_section_ready(&id));

        manager.set_container_rect(Rect::new(0.0, 0.0, 100.0, 50.0));
        assert!(manager.layout().is_section_ready(&id));
    }

    #[test]
    fn snapshots_are_replaced_not_mutated() {
        let manager = LayoutManager::new(Axis::Y);
        let before = manager.layout();
        manager.set_container_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let after = manager.layout();
        assert_eq!(before.container, Rect::ZERO);
        assert_eq!(after.container.width, 10.0);
    }

    #[test]
    fn identical_rect_publishes_nothing() {
        let manager = LayoutManager::new(Axis::Y);
        let published = std::rc::Rc::new(Cell::new(0));
        let counter = std::rc::Rc::clone(&published);
        let _sub = manager.subscribe(move |_| counter.set(counter.get() + 1));

        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        manager.set_container_rect(rect);
        manager.set_container_rect(rect);
        assert_eq!(published.get(), 1);
    }

    #[test]
    fn progress_is_total_over_degenerate_ranges() {
        let mut layout = Layout::default();
        assert_eq!(layout.progress(250.0), 0.0);
        layout.max_scroll_position = -40.0;
        assert_eq!(layout.progress(250.0), 0.0);
        layout.max_scroll_position = 500.0;
        assert_eq!(layout.progress(250.0), 0.5);
        assert_eq!(layout.progress(f64::NAN), 0.0);
    }
}
