//! Per-element keyframe animation.
//!
//! An [`ItemAnimator`] resolves its keyframes whenever the section, container
//! or content rect changes (or its definition or data does), samples one
//! interpolator per property at the current scroll progress, and feeds the
//! result into one spring per property.  Scroll updates pass through a
//! leading + trailing throttle; the host calls [`ItemAnimator::tick`] once
//! per frame to deliver trailing updates and step the springs.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use super::clock::Clock;
use super::container::Section;
use super::geometry::{Axis, Rect};
use super::interpolate::{build_interpolator, Easing, PropertyInterpolator};
use super::keyframes::{resolve_keyframes, Keyframes};
use super::layout::{Layout, LayoutManager, SectionId};
use super::scroll::ScrollStream;
use super::signal::Subscription;
use super::spring::{SpringConfig, SpringOverride, SpringValue};
use super::style::{StyleProperty, StyleSet, StyleValue};
use super::throttle::Throttle;
use crate::error::Result;

/// Per-element tuning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimatorOptions {
    /// Overrides the container's throttle interval.
    pub throttle: Option<Duration>,
    /// Spring parameters layered over each property's family default.
    pub springs: HashMap<StyleProperty, SpringOverride>,
    /// Timing curve inside each keyframe segment.
    pub easing: Easing,
}

impl AnimatorOptions {
    pub fn with_throttle(mut self, interval: Duration) -> Self {
        self.throttle = Some(interval);
        self
    }

    pub fn with_spring(mut self, property: StyleProperty, spring: SpringOverride) -> Self {
        let merged = self.springs.get(&property).copied().unwrap_or_default().or(spring);
        self.springs.insert(property, merged);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn spring_config(&self, property: StyleProperty) -> SpringConfig {
        let base = SpringConfig::for_property(property);
        self.springs
            .get(&property)
            .map_or(base, |spring| spring.apply(base))
    }
}

// ───────────────────────────────────────── tracks ────────────

struct Track {
    property: StyleProperty,
    config: SpringConfig,
    interpolator: Option<PropertyInterpolator>,
    spring: Option<SpringValue>,
}

impl Track {
    /// Raw value at `progress`: the interpolated value, or the identity
    /// when no keyframe mentions the property.
    fn target(&self, progress: f64) -> Option<StyleValue> {
        self.interpolator
            .as_ref()
            .map(|interpolator| interpolator.get(progress))
            .or_else(|| self.property.identity())
    }

    fn retarget(&mut self, progress: f64) {
        match (self.target(progress), self.spring.as_mut()) {
            (Some(target), Some(spring)) => spring.set(target),
            (Some(target), None) => self.spring = Some(SpringValue::new(target, self.config)),
            (None, _) => self.spring = None,
        }
    }
}

/// The layout inputs keyframes depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LayoutInputs {
    section: Rect,
    container: Rect,
    content: Rect,
}

impl LayoutInputs {
    fn of(layout: &Layout, section: &SectionId) -> Option<Self> {
        if !layout.is_section_ready(section) {
            return None;
        }
        Some(Self {
            section: layout.section(section)?,
            container: layout.container,
            content: layout.content,
        })
    }
}

// ───────────────────────────────────────── core ──────────────

struct AnimatorCore<D> {
    section: SectionId,
    axis: Axis,
    layout: LayoutManager,
    scroll: ScrollStream,
    clock: Rc<dyn Clock>,
    keyframes: Keyframes<D>,
    data: Option<D>,
    easing: Easing,
    tracks: Vec<Track>,
    built_for: Option<LayoutInputs>,
    seeded: bool,
    throttle: Throttle<f64>,
    last_step: Option<Instant>,
}

impl<D> AnimatorCore<D> {
    fn on_layout(&mut self, layout: &Layout) {
        let inputs = LayoutInputs::of(layout, &self.section);
        if inputs.is_some() && inputs != self.built_for {
            self.rebuild();
        } else if inputs.is_none() {
            self.built_for = None;
        }
    }

    /// Re-resolve keyframes and rebuild interpolators, then push fresh
    /// targets through a new throttle window.
    fn rebuild(&mut self) {
        let layout = self.layout.layout();
        let Some(inputs) = LayoutInputs::of(&layout, &self.section) else {
            self.built_for = None;
            return;
        };
        let resolved =
            resolve_keyframes(&self.keyframes, &layout, &self.section, self.data.as_ref());
        let map = match resolved {
            Ok(map) => map,
            Err(err) => {
                warn!(section = %self.section, %err, "keyframes could not be resolved");
                return;
            }
        };

        let easing = self.easing;
        for track in &mut self.tracks {
            track.interpolator = build_interpolator(track.property, &map)
                .map(|interpolator| interpolator.with_easing(easing));
        }
        if !self.seeded {
            for track in &mut self.tracks {
                track.spring = track
                    .target(0.0)
                    .map(|seed| SpringValue::new(seed, track.config));
            }
            self.seeded = true;
        }
        self.built_for = Some(inputs);
        debug!(
            section = %self.section,
            keyframes = map.len(),
            animated = self.tracks.iter().filter(|t| t.interpolator.is_some()).count(),
            "rebuilt animation"
        );

        // A rebuild always updates immediately, like a fresh subscription.
        self.throttle = Throttle::new(self.throttle.interval());
        let position = self.scroll.position(self.axis);
        self.offer(position);
    }

    fn offer(&mut self, position: f64) {
        if let Some(position) = self.throttle.call(self.clock.now(), position) {
            self.apply(position);
        }
    }

    fn apply(&mut self, position: f64) {
        if !self.seeded {
            return;
        }
        let progress = self.layout.layout().progress(position);
        trace!(section = %self.section, position, progress, "updating spring targets");
        for track in &mut self.tracks {
            track.retarget(progress);
        }
    }

    fn tick(&mut self) -> bool {
        let now = self.clock.now();
        if let Some(position) = self.throttle.poll(now) {
            trace!(section = %self.section, position, "trailing update");
            self.apply(position);
        }
        let dt = self
            .last_step
            .map_or(Duration::ZERO, |at| now.saturating_duration_since(at));
        self.last_step = Some(now);
        let moving = self
            .tracks
            .iter_mut()
            .filter_map(|track| track.spring.as_mut())
            .fold(false, |moving, spring| spring.step(dt) | moving);
        moving || self.throttle.has_pending()
    }

    fn collect(&self, read: impl Fn(&SpringValue) -> StyleValue) -> StyleSet {
        self.tracks
            .iter()
            .filter_map(|track| track.spring.as_ref().map(|s| (track.property, read(s))))
            .collect()
    }
}

// ───────────────────────────────────────── animator ──────────

/// Animates one element inside a section.
///
/// Dropping the animator releases its layout and scroll subscriptions and
/// discards any pending trailing update.
pub struct ItemAnimator<D = ()> {
    core: Rc<RefCell<AnimatorCore<D>>>,
    _subscriptions: Vec<Subscription>,
}

impl<D: PartialEq + 'static> ItemAnimator<D> {
    pub fn new(section: &Section, keyframes: Keyframes<D>) -> Result<Self> {
        Self::with_options(section, keyframes, None, AnimatorOptions::default())
    }

    pub fn with_options(
        section: &Section,
        keyframes: Keyframes<D>,
        data: Option<D>,
        options: AnimatorOptions,
    ) -> Result<Self> {
        let container = section.container()?;
        let tracks = StyleProperty::ALL
            .iter()
            .map(|&property| Track {
                property,
                config: options.spring_config(property),
                interpolator: None,
                spring: None,
            })
            .collect();
        let core = Rc::new(RefCell::new(AnimatorCore {
            section: section.id().clone(),
            axis: container.axis(),
            layout: container.layout_manager().clone(),
            scroll: container.scroll().clone(),
            clock: container.clock(),
            keyframes,
            data,
            easing: options.easing,
            tracks,
            built_for: None,
            seeded: false,
            throttle: Throttle::new(options.throttle.unwrap_or_else(|| container.throttle())),
            last_step: None,
        }));

        let on_layout = Rc::downgrade(&core);
        let on_scroll = Rc::downgrade(&core);
        let subscriptions = vec![
            container.layout_manager().subscribe(move |layout| {
                with_core(&on_layout, |core| core.on_layout(layout));
            }),
            container.scroll().on_position(container.axis(), move |position| {
                with_core(&on_scroll, |core| core.offer(*position));
            }),
        ];
        core.borrow_mut().rebuild();

        Ok(Self {
            core,
            _subscriptions: subscriptions,
        })
    }

    /// Swap the keyframe definition.  Handles to the same definition are a
    /// no-op.
    pub fn set_keyframes(&self, keyframes: Keyframes<D>) {
        let mut core = self.core.borrow_mut();
        if core.keyframes.same_definition(&keyframes) {
            return;
        }
        core.keyframes = keyframes;
        core.rebuild();
    }

    /// Replace the user data passed to keyframe functions.  Equal data is a
    /// no-op.
    pub fn set_data(&self, data: Option<D>) {
        let mut core = self.core.borrow_mut();
        if core.data == data {
            return;
        }
        core.data = data;
        core.rebuild();
    }
}

impl<D> ItemAnimator<D> {
    /// Deliver any due trailing update and step every spring to the clock's
    /// current time.  Returns whether the host must keep ticking: a spring
    /// is still moving or a trailing update has yet to be delivered.
    pub fn tick(&self) -> bool {
        self.core.borrow_mut().tick()
    }

    /// Switch the timing curve.  Springs keep their current state and
    /// head for the re-eased targets.
    pub fn set_easing(&self, easing: Easing) {
        let mut core = self.core.borrow_mut();
        if core.easing == easing {
            return;
        }
        core.easing = easing;
        core.rebuild();
    }

    pub fn easing(&self) -> Easing {
        self.core.borrow().easing
    }

    /// Whether keyframes have been resolved at least once.
    pub fn is_ready(&self) -> bool {
        self.core.borrow().seeded
    }

    /// Current smoothed values.  Properties with no value (colours nobody
    /// animates) are absent.
    pub fn values(&self) -> StyleSet {
        self.core.borrow().collect(SpringValue::get)
    }

    /// Where each spring is heading.
    pub fn targets(&self) -> StyleSet {
        self.core.borrow().collect(SpringValue::target)
    }

    pub fn value(&self, property: StyleProperty) -> Option<StyleValue> {
        self.core
            .borrow()
            .tracks
            .iter()
            .find(|track| track.property == property)
            .and_then(|track| track.spring.as_ref())
            .map(SpringValue::get)
    }

    /// CSS `transform` for the current smoothed values.
    pub fn css_transform(&self) -> String {
        self.values().to_css_transform()
    }

    /// When the pending trailing update is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.core.borrow().throttle.next_deadline()
    }

    pub fn section(&self) -> SectionId {
        self.core.borrow().section.clone()
    }
}

impl<D> Drop for ItemAnimator<D> {
    fn drop(&mut self) {
        if let Ok(mut core) = self.core.try_borrow_mut() {
            core.throttle.cancel();
        }
    }
}

impl<D> fmt::Debug for ItemAnimator<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.core.try_borrow() {
            Ok(core) => f
                .debug_struct("ItemAnimator")
                .field("section", &core.section)
                .field("keyframes", &core.keyframes)
                .field("seeded", &core.seeded)
                .finish_non_exhaustive(),
            Err(_) => f.write_str("ItemAnimator(<busy>)"),
        }
    }
}

/// Run `f` against the core if it is alive and not already borrowed.  A
/// reentrant notification (a keyframe function that edits layout) is
/// dropped; the outer rebuild already sees the newest snapshot.
fn with_core<D>(core: &Weak<RefCell<AnimatorCore<D>>>, f: impl FnOnce(&mut AnimatorCore<D>)) {
    let Some(core) = core.upgrade() else {
        return;
    };
    let Ok(mut core) = core.try_borrow_mut() else {
        trace!("skipping reentrant animator update");
        return;
    };
    f(&mut core);
}
