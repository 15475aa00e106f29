//! Values derived from scroll state.
//!
//! A derivation runs a selector over the section's geometry and the
//! container's scroll position and velocity.  It re-runs synchronously on
//! every layout change and every position or velocity change on the
//! container's axis, but never before the section is ready.  Replacing the
//! selector swaps it in place; the underlying subscriptions stay put.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use super::container::{ScrollContainer, Section};
use super::geometry::{Axis, ContainerGeometry, SectionGeometry};
use super::layout::{LayoutManager, SectionId};
use super::scroll::ScrollStream;
use super::signal::{Latest, Signal, Subscription};
use crate::error::Result;

/// Everything a selector can look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollContext {
    pub section: SectionGeometry,
    pub container: ContainerGeometry,
    pub max_scroll_position: f64,
    pub position: f64,
    pub velocity: f64,
}

impl ScrollContext {
    /// `position / max_scroll_position`, or `0` without a scroll range.
    pub fn progress(&self) -> f64 {
        if self.max_scroll_position.is_finite() && self.max_scroll_position > 0.0 {
            self.position / self.max_scroll_position
        } else {
            0.0
        }
    }
}

type Selector<T> = dyn FnMut(&ScrollContext) -> T;

/// Selector runs per notification when the selector keeps moving its inputs.
const MAX_PASSES: usize = 8;

struct Derivation<T> {
    section: SectionId,
    axis: Axis,
    layout: LayoutManager,
    scroll: ScrollStream,
    selector: Latest<Selector<T>>,
    /// Set when inputs change while the selector is running.
    stale: Cell<bool>,
    output: Signal<Option<T>>,
}

impl<T: Clone + PartialEq + 'static> Derivation<T> {
    fn context(&self) -> Option<ScrollContext> {
        let layout = self.layout.layout();
        if !layout.is_section_ready(&self.section) {
            return None;
        }
        let section = layout.section_geometry(&self.section)?;
        let sample = self.scroll.sample(self.axis);
        Some(ScrollContext {
            section,
            container: layout.container_geometry(),
            max_scroll_position: layout.max_scroll_position,
            position: sample.position,
            velocity: sample.velocity,
        })
    }

    /// Run the selector and publish its result.  A selector that changes
    /// its own inputs is not re-entered; the outer call runs it again
    /// against the new inputs, up to [`MAX_PASSES`] times.
    fn recompute(&self) {
        let mut next = None;
        for _ in 0..MAX_PASSES {
            let Some(context) = self.context() else {
                return;
            };
            trace!(section = %self.section, position = context.position, "recomputing scroll derivation");
            self.stale.set(false);
            let Some(value) = self.selector.try_with(|select| select(&context)) else {
                self.stale.set(true);
                return;
            };
            next = Some(value);
            if !self.stale.get() {
                break;
            }
        }
        if self.stale.get() {
            warn!(section = %self.section, "scroll selector keeps changing its own inputs");
        }
        if let Some(value) = next {
            self.output.set(Some(value));
        }
    }

    /// Subscribe to every input and run once if already ready.
    fn attach(self: &Rc<Self>) -> Vec<Subscription> {
        let trigger = |weak: Weak<Self>| {
            move || {
                if let Some(derivation) = weak.upgrade() {
                    derivation.recompute();
                }
            }
        };
        let on_layout = trigger(Rc::downgrade(self));
        let on_position = trigger(Rc::downgrade(self));
        let on_velocity = trigger(Rc::downgrade(self));
        let subscriptions = vec![
            self.layout.subscribe(move |_| on_layout()),
            self.scroll.on_position(self.axis, move |_| on_position()),
            self.scroll.on_velocity(self.axis, move |_| on_velocity()),
        ];
        self.recompute();
        subscriptions
    }
}

fn derive<T: Clone + PartialEq + 'static>(
    container: &ScrollContainer,
    section: &SectionId,
    selector: Box<Selector<T>>,
) -> (Rc<Derivation<T>>, Vec<Subscription>) {
    let derivation = Rc::new(Derivation {
        section: section.clone(),
        axis: container.axis(),
        layout: container.layout_manager().clone(),
        scroll: container.scroll().clone(),
        selector: Latest::new(selector),
        stale: Cell::new(false),
        output: Signal::new(None),
    });
    let subscriptions = derivation.attach();
    (derivation, subscriptions)
}

// ───────────────────────────────────────── state ─────────────

/// Latest derived value, with change notification.
///
/// Dropping it releases every subscription it holds.
pub struct ScrollState<T: Clone + PartialEq + 'static> {
    derivation: Rc<Derivation<T>>,
    _subscriptions: Vec<Subscription>,
}

impl<T: Clone + PartialEq + 'static> ScrollState<T> {
    /// `None` until the section has been ready at least once.
    pub fn get(&self) -> Option<T> {
        self.derivation.output.get()
    }

    /// Run `f` with each new value.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription {
        self.derivation.output.subscribe(move |value| {
            if let Some(value) = value {
                f(value);
            }
        })
    }

    pub fn set_selector(&self, selector: impl FnMut(&ScrollContext) -> T + 'static) {
        self.derivation.selector.replace(Box::new(selector));
    }

    /// Re-run the selector against current inputs.
    pub fn refresh(&self) {
        self.derivation.recompute();
    }
}

/// Derive a value of type `T` from `section`'s scroll state.
pub fn scroll_state<T: Clone + PartialEq + 'static>(
    section: &Section,
    selector: impl FnMut(&ScrollContext) -> T + 'static,
) -> Result<ScrollState<T>> {
    let container = section.container()?;
    let (derivation, subscriptions) = derive(&container, section.id(), Box::new(selector));
    Ok(ScrollState {
        derivation,
        _subscriptions: subscriptions,
    })
}

// ───────────────────────────────────────── value ─────────────

/// Live derived value exposed as a [`Signal`] for consumers that pull.
pub struct ScrollValue<T: Clone + PartialEq + 'static> {
    derivation: Rc<Derivation<T>>,
    _subscriptions: Vec<Subscription>,
}

impl<T: Clone + PartialEq + 'static> ScrollValue<T> {
    pub fn get(&self) -> Option<T> {
        self.derivation.output.get()
    }

    /// The output signal.  Clones stay readable after this handle drops but
    /// stop updating.
    pub fn signal(&self) -> Signal<Option<T>> {
        self.derivation.output.clone()
    }

    pub fn set_selector(&self, selector: impl FnMut(&ScrollContext) -> T + 'static) {
        self.derivation.selector.replace(Box::new(selector));
    }
}

/// Like [`scroll_state`], handing out the output as a signal.
pub fn scroll_value<T: Clone + PartialEq + 'static>(
    section: &Section,
    selector: impl FnMut(&ScrollContext) -> T + 'static,
) -> Result<ScrollValue<T>> {
    let container = section.container()?;
    let (derivation, subscriptions) = derive(&container, section.id(), Box::new(selector));
    Ok(ScrollValue {
        derivation,
        _subscriptions: subscriptions,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::core::container::ContainerOptions;
    use crate::core::geometry::Rect;
    use crate::error::Error;

    fn container() -> ScrollContainer {
        ScrollContainer::new(ContainerOptions::default())
    }

    #[test]
    fn selector_waits_for_readiness() {
        let container = container();
        let section = container.section("hero");
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let state = scroll_state(&section, move |ctx| {
            counter.set(counter.get() + 1);
            ctx.section.height()
        })
        .unwrap();

        container.scroll_to(40.0);
        container.set_content_rect(Rect::new(0.0, 0.0, 100.0, 400.0));
        assert_eq!(calls.get(), 0);
        assert_eq!(state.get(), None);

        container.set_container_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        section.set_rect(Rect::new(0.0, 0.0, 100.0, 150.0)).unwrap();
        assert!(calls.get() >= 1);
        assert_eq!(state.get(), Some(150.0));
    }

    #[test]
    fn recomputes_on_active_axis_only() {
        let container = container();
        container.set_container_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        container.set_content_rect(Rect::new(0.0, 0.0, 100.0, 300.0));
        let section = container.add_section("a", Rect::new(0.0, 0.0, 100.0, 100.0));
        let state = scroll_state(&section, |ctx| ctx.progress()).unwrap();
        assert_eq!(state.get(), Some(0.0));

        container.scroll().record(Axis::X, 999.0, container.now());
        assert_eq!(state.get(), Some(0.0));

        container.scroll_to(100.0);
        assert_eq!(state.get(), Some(0.5));
    }

    #[test]
    fn replaced_selector_is_used_without_resubscribing() {
        let container = container();
        container.set_container_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        let section = container.add_section("a", Rect::new(0.0, 0.0, 100.0, 100.0));
        let value = scroll_value(&section, |ctx| ctx.position).unwrap();

        value.set_selector(|ctx| ctx.position * 2.0);
        container.scroll_to(30.0);
        assert_eq!(value.get(), Some(60.0));
        assert_eq!(value.signal().get(), Some(60.0));
    }

    #[test]
    fn dropping_the_state_stops_recomputation() {
        let container = container();
        container.set_container_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        let section = container.add_section("a", Rect::new(0.0, 0.0, 100.0, 100.0));
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let state = scroll_state(&section, move |ctx| {
            counter.set(counter.get() + 1);
            ctx.position
        })
        .unwrap();
        let before = calls.get();

        drop(state);
        container.scroll_to(10.0);
        container.scroll().set_velocity(Axis::Y, 5.0);
        container.set_container_rect(Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(calls.get(), before);
    }

    #[test]
    fn subscribers_see_each_new_value() {
        let container = container();
        container.set_container_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        let section = container.add_section("a", Rect::new(0.0, 0.0, 100.0, 100.0));
        let state = scroll_state(&section, |ctx| ctx.position.round() as i64).unwrap();
        let last = Rc::new(Cell::new(-1));
        let sink = Rc::clone(&last);
        let _sub = state.subscribe(move |v| sink.set(*v));
        container.scroll_to(12.4);
        assert_eq!(last.get(), 12);
    }

    #[test]
    fn selector_may_scroll_its_own_container() {
        let container = container();
        container.set_container_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        container.set_content_rect(Rect::new(0.0, 0.0, 100.0, 500.0));
        let section = container.add_section("a", Rect::new(0.0, 0.0, 100.0, 100.0));
        let handle = section.container().unwrap();
        let state = scroll_state(&section, move |ctx| {
            if ctx.position > 200.0 {
                handle.scroll_to(200.0);
            }
            ctx.position
        })
        .unwrap();

        container.scroll_to(300.0);
        assert_eq!(container.position(), 200.0);
        assert_eq!(state.get(), Some(200.0));

        container.scroll_to(50.0);
        assert_eq!(state.get(), Some(50.0));
    }

    #[test]
    fn selector_may_replace_itself() {
        let container = container();
        container.set_container_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        let section = container.add_section("a", Rect::new(0.0, 0.0, 100.0, 100.0));
        let state: Rc<RefCell<Option<ScrollState<f64>>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&state);
        let first = scroll_state(&section, move |ctx| {
            if ctx.position > 0.0 {
                if let Some(state) = slot.borrow().as_ref() {
                    state.set_selector(|ctx| -ctx.position);
                }
            }
            ctx.position
        })
        .unwrap();
        *state.borrow_mut() = Some(first);

        container.scroll_to(10.0);
        let read = |state: &Rc<RefCell<Option<ScrollState<f64>>>>| {
            state.borrow().as_ref().and_then(ScrollState::get)
        };
        assert_eq!(read(&state), Some(10.0));
        container.scroll_to(20.0);
        assert_eq!(read(&state), Some(-20.0));
        state.borrow_mut().take();
    }

    #[test]
    fn refresh_picks_up_outside_inputs() {
        let container = container();
        container.set_container_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        container.set_content_rect(Rect::new(0.0, 0.0, 100.0, 300.0));
        let section = container.add_section("a", Rect::new(0.0, 0.0, 100.0, 100.0));
        let threshold = Rc::new(Cell::new(50.0));
        let limit = Rc::clone(&threshold);
        let state = scroll_state(&section, move |ctx| ctx.position >= limit.get()).unwrap();

        container.scroll_to(40.0);
        assert_eq!(state.get(), Some(false));

        threshold.set(30.0);
        assert_eq!(state.get(), Some(false));
        state.refresh();
        assert_eq!(state.get(), Some(true));
    }

    #[test]
    fn detached_section_is_rejected() {
        let section = container().section("gone");
        assert!(matches!(
            scroll_state(&section, |ctx| ctx.position),
            Err(Error::ContainerDropped(_))
        ));
    }
}
