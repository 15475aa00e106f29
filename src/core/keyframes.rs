//! Keyframe definitions and their resolution against live layout.
//!
//! Authors anchor keyframes at absolute scroll offsets, usually computed from
//! section geometry (`section.top_at(Anchor::End)` and friends).  Resolution
//! turns those offsets into progress in `[0, 1]` by dividing by the layout's
//! maximum scroll position.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use super::geometry::{ContainerGeometry, SectionGeometry};
use super::layout::{Layout, SectionId};
use super::style::StyleSet;
use crate::error::{Error, Result};

/// Geometry handed to a keyframe function.
#[derive(Debug)]
pub struct KeyframesContext<'a, D> {
    pub section: SectionGeometry,
    pub container: ContainerGeometry,
    pub max_scroll_position: f64,
    pub data: Option<&'a D>,
}

// ───────────────────────────────────────── offsets ───────────

/// Keyframes keyed by absolute scroll offset, in authoring order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyframeOffsets(Vec<(f64, StyleSet)>);

impl KeyframeOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`KeyframeOffsets::push`].
    pub fn at(mut self, offset: f64, style: StyleSet) -> Self {
        self.push(offset, style);
        self
    }

    pub fn push(&mut self, offset: f64, style: StyleSet) {
        self.0.push((offset, style));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(f64, StyleSet)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(f64, StyleSet)> for KeyframeOffsets {
    fn from_iter<I: IntoIterator<Item = (f64, StyleSet)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ───────────────────────────────────────── definition ────────

type KeyframesFn<D> = dyn Fn(&KeyframesContext<'_, D>) -> KeyframeOffsets;

/// A keyframe definition: either fixed offsets or a function of geometry.
///
/// Cloning shares the definition.  Two handles are "the same definition" when
/// they point at the same allocation, which is what triggers re-resolution in
/// the animator.
pub enum Keyframes<D = ()> {
    Static(Rc<KeyframeOffsets>),
    Dynamic(Rc<KeyframesFn<D>>),
}

impl<D> Keyframes<D> {
    pub fn from_offsets(offsets: KeyframeOffsets) -> Self {
        Keyframes::Static(Rc::new(offsets))
    }

    pub fn from_fn(f: impl Fn(&KeyframesContext<'_, D>) -> KeyframeOffsets + 'static) -> Self {
        Keyframes::Dynamic(Rc::new(f))
    }

    pub fn same_definition(&self, other: &Keyframes<D>) -> bool {
        match (self, other) {
            (Keyframes::Static(a), Keyframes::Static(b)) => Rc::ptr_eq(a, b),
            (Keyframes::Dynamic(a), Keyframes::Dynamic(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<D> Clone for Keyframes<D> {
    fn clone(&self) -> Self {
        match self {
            Keyframes::Static(offsets) => Keyframes::Static(Rc::clone(offsets)),
            Keyframes::Dynamic(f) => Keyframes::Dynamic(Rc::clone(f)),
        }
    }
}

impl<D> Default for Keyframes<D> {
    fn default() -> Self {
        Keyframes::from_offsets(KeyframeOffsets::new())
    }
}

impl<D> fmt::Debug for Keyframes<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyframes::Static(offsets) => f.debug_tuple("Static").field(offsets).finish(),
            Keyframes::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

// ───────────────────────────────────────── normalised ────────

/// Keyframes keyed by progress.  Keys are unique and strictly ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedKeyframeMap {
    entries: Vec<(f64, StyleSet)>,
}

impl NormalizedKeyframeMap {
    /// Normalise `offsets` against `layout`.  Offsets are ordered
    /// numerically; offsets that land on the same progress merge, later
    /// keyframes overriding earlier ones property by property.
    pub fn from_offsets(offsets: &KeyframeOffsets, layout: &Layout) -> Self {
        let mut sorted: Vec<&(f64, StyleSet)> = offsets
            .iter()
            .filter(|(offset, _)| {
                let finite = offset.is_finite();
                if !finite {
                    warn!(offset, "ignoring keyframe at non-finite offset");
                }
                finite
            })
            .collect();
        sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let mut entries: Vec<(f64, StyleSet)> = Vec::with_capacity(sorted.len());
        for (offset, style) in sorted {
            let progress = layout.progress(*offset);
            match entries.last_mut() {
                Some((last, merged)) if *last == progress => merged.merge(style),
                _ => entries.push((progress, style.clone())),
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[(f64, StyleSet)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &(f64, StyleSet)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve `definition` for `section_id` against `layout`.
///
/// Function definitions need the section's measured rect and fail with
/// [`Error::UnknownSection`] without it; static definitions do not look at
/// geometry at all.
pub fn resolve_keyframes<D>(
    definition: &Keyframes<D>,
    layout: &Layout,
    section_id: &SectionId,
    data: Option<&D>,
) -> Result<NormalizedKeyframeMap> {
    let map = match definition {
        Keyframes::Static(offsets) => NormalizedKeyframeMap::from_offsets(offsets, layout),
        Keyframes::Dynamic(f) => {
            let section = layout
                .section_geometry(section_id)
                .ok_or_else(|| Error::UnknownSection(section_id.clone()))?;
            let context = KeyframesContext {
                section,
                container: layout.container_geometry(),
                max_scroll_position: layout.max_scroll_position,
                data,
            };
            NormalizedKeyframeMap::from_offsets(&f(&context), layout)
        }
    };
    debug!(
        section = %section_id,
        keyframes = map.len(),
        max_scroll = layout.max_scroll_position,
        "resolved keyframes"
    );
    Ok(map)
}
