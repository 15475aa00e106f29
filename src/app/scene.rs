//! The demo scene: a scroll container holding a handful of animated
//! sections, laid out along the configured axis.
//!
//! Each section owns one [`ItemAnimator`] plus two derived values: whether
//! it is on screen and how far the viewport has travelled through it.

use std::rc::Rc;
use std::time::Instant;

use scroll_keyframes::{
    scroll_state, scroll_value, Anchor, AnimatorOptions, Axis, Clock, ContainerOptions, Easing,
    ItemAnimator, KeyframeOffsets, Keyframes, KeyframesContext, Rect, Result, ScrollContainer,
    ScrollState, ScrollValue, Section, StyleProperty, StyleSet, StyleValue,
};
use tracing::debug;

/// Host-measured parameters passed to keyframe functions as user data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTuning {
    /// How far the sliding section starts off its resting place, in cells.
    pub slide_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Fade,
    Slide,
    Colour,
    Grow,
}

impl SectionKind {
    pub const ALL: &[SectionKind] = &[
        SectionKind::Fade,
        SectionKind::Slide,
        SectionKind::Colour,
        SectionKind::Grow,
    ];

    pub fn id(self) -> &'static str {
        match self {
            SectionKind::Fade => "fade",
            SectionKind::Slide => "slide",
            SectionKind::Colour => "colour",
            SectionKind::Grow => "grow",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Fade => "Fade in, fade out",
            SectionKind::Slide => "Slide into place",
            SectionKind::Colour => "Colour sweep",
            SectionKind::Grow => "Grow from the middle",
        }
    }

    /// Keyframes anchored to the section's own edges, so they follow it
    /// through every resize.
    pub fn keyframes(self, axis: Axis) -> Keyframes<SceneTuning> {
        match self {
            SectionKind::Fade => Keyframes::from_fn(move |ctx: &KeyframesContext<'_, SceneTuning>| {
                KeyframeOffsets::new()
                    .at(ctx.section.start_at(axis, Anchor::End), StyleSet::new().opacity(0.0))
                    .at(ctx.section.start_at(axis, Anchor::Center), StyleSet::new().opacity(1.0))
                    .at(ctx.section.end_at(axis, Anchor::Start), StyleSet::new().opacity(0.25))
            }),
            SectionKind::Slide => {
                let across = match axis {
                    Axis::Y => StyleProperty::TranslateX,
                    Axis::X => StyleProperty::TranslateY,
                };
                Keyframes::from_fn(move |ctx: &KeyframesContext<'_, SceneTuning>| {
                    let distance = ctx.data.map_or(20.0, |tuning| tuning.slide_distance);
                    KeyframeOffsets::new()
                        .at(
                            ctx.section.start_at(axis, Anchor::End),
                            StyleSet::new().with(across, StyleValue::px(-distance)),
                        )
                        .at(
                            ctx.section.start_at(axis, Anchor::Center),
                            StyleSet::new().with(across, StyleValue::px(0.0)),
                        )
                })
            }
            SectionKind::Colour => Keyframes::from_fn(move |ctx: &KeyframesContext<'_, SceneTuning>| {
                KeyframeOffsets::new()
                    .at(
                        ctx.section.start_at(axis, Anchor::End),
                        StyleSet::new().background_color(StyleValue::rgb(40, 70, 160)),
                    )
                    .at(
                        ctx.section.start_at(axis, Anchor::Center),
                        StyleSet::new().background_color(StyleValue::rgb(220, 130, 40)),
                    )
                    .at(
                        ctx.section.end_at(axis, Anchor::Start),
                        StyleSet::new().background_color(StyleValue::rgb(170, 40, 90)),
                    )
            }),
            SectionKind::Grow => {
                let along = match axis {
                    Axis::Y => StyleProperty::ScaleX,
                    Axis::X => StyleProperty::ScaleY,
                };
                Keyframes::from_fn(move |ctx: &KeyframesContext<'_, SceneTuning>| {
                    KeyframeOffsets::new()
                        .at(
                            ctx.section.start_at(axis, Anchor::End),
                            StyleSet::new().with(along, 0.2).opacity(0.4),
                        )
                        .at(
                            ctx.section.start_at(axis, Anchor::Center),
                            StyleSet::new().with(along, 1.0).opacity(1.0),
                        )
                })
            }
        }
    }
}

struct SceneItem {
    kind: SectionKind,
    section: Section,
    animator: ItemAnimator<SceneTuning>,
    visible: ScrollState<bool>,
    travel: ScrollValue<f64>,
}

/// Everything the widgets need to draw one frame.
#[derive(Debug, Clone)]
pub struct SceneFrame {
    pub axis: Axis,
    pub position: f64,
    pub max_scroll_position: f64,
    pub progress: f64,
    pub velocity: f64,
    pub easing: Easing,
    pub items: Vec<ItemFrame>,
}

#[derive(Debug, Clone)]
pub struct ItemFrame {
    pub kind: SectionKind,
    /// Measured rect in content coordinates.
    pub rect: Option<Rect>,
    pub values: StyleSet,
    pub transform: String,
    pub visible: bool,
    /// `0` when the section's leading edge enters the viewport, `1` when its
    /// trailing edge leaves it.
    pub travel: f64,
}

pub struct Scene {
    container: ScrollContainer,
    options: AnimatorOptions,
    tuning: Option<SceneTuning>,
    items: Vec<SceneItem>,
    velocity: ScrollValue<f64>,
}

impl Scene {
    pub fn new(
        container_options: ContainerOptions,
        options: AnimatorOptions,
        clock: Rc<dyn Clock>,
    ) -> Result<Self> {
        let container = ScrollContainer::with_clock(container_options, clock);
        let items = SectionKind::ALL
            .iter()
            .map(|&kind| build_item(&container, kind, None, &options))
            .collect::<Result<Vec<_>>>()?;
        let velocity = scroll_value(&container.section(SectionKind::Fade.id()), |ctx| ctx.velocity)?;
        Ok(Self {
            container,
            options,
            tuning: None,
            items,
            velocity,
        })
    }

    pub fn axis(&self) -> Axis {
        self.container.axis()
    }

    pub fn easing(&self) -> Easing {
        self.options.easing
    }

    /// Re-measure everything for a viewport of `width` × `height` cells.
    pub fn layout(&mut self, width: f64, height: f64) -> Result<()> {
        let axis = self.axis();
        let viewport = Rect::new(0.0, 0.0, width, height);
        let extent = viewport.extent(axis);
        let across = match axis {
            Axis::Y => width,
            Axis::X => height,
        };

        let section_extent = (extent * 0.6).round().max(4.0);
        let gap = (extent * 0.5).round().max(2.0);
        let lead = extent;
        let count = self.items.len() as f64;
        let content_extent = lead * 2.0 + count * section_extent + (count - 1.0) * gap;

        let along = |start: f64, length: f64| match axis {
            Axis::Y => Rect::new(0.0, start, width, length),
            Axis::X => Rect::new(start, 0.0, length, height),
        };

        self.container.set_container_rect(viewport);
        self.container.set_content_rect(along(0.0, content_extent));
        for (i, item) in self.items.iter().enumerate() {
            let start = lead + i as f64 * (section_extent + gap);
            item.section.set_rect(along(start, section_extent))?;
        }

        let tuning = SceneTuning {
            slide_distance: (across / 3.0).round(),
        };
        if self.tuning != Some(tuning) {
            self.tuning = Some(tuning);
            for item in &self.items {
                item.animator.set_data(Some(tuning));
            }
        }
        debug!(width, height, content_extent, "scene laid out");
        Ok(())
    }

    pub fn max_scroll_position(&self) -> f64 {
        self.container.layout().max_scroll_position
    }

    pub fn scroll_to(&self, position: f64) {
        self.container.scroll_to(position);
    }

    /// Switch easing curve in place; elements carry on from where they are.
    pub fn set_easing(&mut self, easing: Easing) {
        self.options.easing = easing;
        for item in &self.items {
            item.animator.set_easing(easing);
        }
    }

    /// Step scroll smoothing and every animator.  Returns whether anything
    /// is still moving.
    pub fn tick(&self) -> bool {
        self.container.tick();
        let mut moving = self.container.scroll().is_settling();
        for item in &self.items {
            moving |= item.animator.tick();
        }
        moving
    }

    /// Earliest pending trailing update across all animators.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.items
            .iter()
            .filter_map(|item| item.animator.next_deadline())
            .min()
    }

    pub fn frame(&self) -> SceneFrame {
        let layout = self.container.layout();
        SceneFrame {
            axis: self.axis(),
            position: self.container.position(),
            max_scroll_position: layout.max_scroll_position,
            progress: self.container.progress(),
            velocity: self.velocity.get().unwrap_or(0.0),
            easing: self.options.easing,
            items: self
                .items
                .iter()
                .map(|item| ItemFrame {
                    kind: item.kind,
                    rect: layout.section(item.section.id()),
                    values: item.animator.values(),
                    transform: item.animator.css_transform(),
                    visible: item.visible.get().unwrap_or(false),
                    travel: item.travel.get().unwrap_or(0.0),
                })
                .collect(),
        }
    }
}

fn build_item(
    container: &ScrollContainer,
    kind: SectionKind,
    tuning: Option<SceneTuning>,
    options: &AnimatorOptions,
) -> Result<SceneItem> {
    let axis = container.axis();
    let section = container.section(kind.id());
    let animator =
        ItemAnimator::with_options(&section, kind.keyframes(axis), tuning, options.clone())?;
    let visible = scroll_state(&section, move |ctx| {
        let enters = ctx.section.start_at(axis, Anchor::End);
        let leaves = ctx.section.end_at(axis, Anchor::Start);
        ctx.position > enters && ctx.position < leaves
    })?;
    let travel = scroll_value(&section, move |ctx| {
        let enters = ctx.section.start_at(axis, Anchor::End);
        let leaves = ctx.section.end_at(axis, Anchor::Start);
        let span = leaves - enters;
        if span > 0.0 {
            ((ctx.position - enters) / span).clamp(0.0, 1.0)
        } else {
            0.0
        }
    })?;
    Ok(SceneItem {
        kind,
        section,
        animator,
        visible,
        travel,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use scroll_keyframes::ManualClock;

    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn scene() -> (Rc<ManualClock>, Scene) {
        let clock = Rc::new(ManualClock::new());
        let options = ContainerOptions {
            throttle: Duration::ZERO,
            ..ContainerOptions::default()
        };
        let mut scene = Scene::new(options, AnimatorOptions::default(), clock.clone()).unwrap();
        scene.layout(60.0, 20.0).unwrap();
        (clock, scene)
    }

    fn settle(clock: &ManualClock, scene: &Scene) {
        for _ in 0..400 {
            clock.advance(FRAME);
            scene.tick();
        }
    }

    fn item(frame: &SceneFrame, kind: SectionKind) -> &ItemFrame {
        frame.items.iter().find(|item| item.kind == kind).unwrap()
    }

    #[test]
    fn sections_start_below_the_fold() {
        let (_, scene) = scene();
        let frame = scene.frame();
        assert!(frame.max_scroll_position > 0.0);
        for item in &frame.items {
            assert!(!item.visible, "{:?} visible at rest", item.kind);
            assert_eq!(item.travel, 0.0);
        }
        let fade = item(&frame, SectionKind::Fade);
        assert_eq!(fade.values.get(StyleProperty::Opacity), Some(&StyleValue::Number(0.0)));
    }

    #[test]
    fn scrolling_to_a_section_centre_plays_its_keyframes() {
        let (clock, scene) = scene();
        let fade_rect = scene.frame().items[0].rect.unwrap();
        // Section top at the viewport centre.
        scene.scroll_to(fade_rect.y - 10.0);
        settle(&clock, &scene);

        let frame = scene.frame();
        let fade = item(&frame, SectionKind::Fade);
        assert!(fade.visible);
        let opacity = fade.values.get(StyleProperty::Opacity).and_then(StyleValue::as_number);
        assert!((opacity.unwrap() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn resizing_updates_slide_distance() {
        let (clock, mut scene) = scene();
        settle(&clock, &scene);
        let before = item(&scene.frame(), SectionKind::Slide)
            .values
            .get(StyleProperty::TranslateX)
            .and_then(StyleValue::as_number)
            .unwrap();
        assert!((before + 20.0).abs() < 1e-3);

        scene.layout(90.0, 20.0).unwrap();
        settle(&clock, &scene);
        let after = item(&scene.frame(), SectionKind::Slide)
            .values
            .get(StyleProperty::TranslateX)
            .and_then(StyleValue::as_number)
            .unwrap();
        assert!((after + 30.0).abs() < 1e-3);
    }

    #[test]
    fn easing_switch_keeps_the_scene_live() {
        let (clock, mut scene) = scene();
        scene.set_easing(Easing::EaseInOut);
        assert_eq!(scene.easing(), Easing::EaseInOut);
        let colour_rect = item(&scene.frame(), SectionKind::Colour).rect.unwrap();
        scene.scroll_to(colour_rect.y - 10.0);
        settle(&clock, &scene);
        let frame = scene.frame();
        let colour = item(&frame, SectionKind::Colour);
        let shown = colour
            .values
            .get(StyleProperty::BackgroundColor)
            .and_then(StyleValue::as_color)
            .unwrap();
        let expected = StyleValue::rgb(220, 130, 40).as_color().unwrap();
        assert!((shown.red - expected.red).abs() < 1.0 / 255.0);
        assert!((shown.green - expected.green).abs() < 1.0 / 255.0);
        assert!((shown.blue - expected.blue).abs() < 1.0 / 255.0);
    }

    #[test]
    fn easing_switch_leaves_elements_where_they_are() {
        let (clock, mut scene) = scene();
        let fade_rect = scene.frame().items[0].rect.unwrap();
        scene.scroll_to(fade_rect.y - 10.0);
        settle(&clock, &scene);
        let before = item(&scene.frame(), SectionKind::Fade).values.clone();

        scene.set_easing(Easing::EaseIn);
        let after = item(&scene.frame(), SectionKind::Fade).values.clone();
        assert_eq!(before, after);
    }
}
