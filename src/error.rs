//! Crate-wide error type.
//!
//! Only caller wiring mistakes and configuration problems surface here.
//! Numeric edge cases (zero scroll range, NaN progress, mismatched keyframe
//! values) are absorbed by the engine and never become errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::layout::SectionId;

/// Errors reported by the scroll animation engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The layout has no rect recorded for this section id.
    #[error("section `{0}` has no measured rect in this layout")]
    UnknownSection(SectionId),

    /// A section handle outlived the container it belongs to.
    #[error("section `{0}` was used after its scroll container was dropped")]
    ContainerDropped(SectionId),

    #[error(
        "invalid anchor `{0}` (expected container-top/left/start, container-center or container-bottom/right/end)"
    )]
    InvalidAnchor(String),

    #[error("invalid scroll axis `{0}` (expected `x` or `y`)")]
    InvalidAxis(String),

    #[error("unknown style property `{0}`")]
    UnknownProperty(String),

    #[error("cannot parse style value `{0}`")]
    InvalidValue(String),

    #[error("unknown easing `{0}` (expected linear, ease-in, ease-out or ease-in-out)")]
    InvalidEasing(String),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
