//! The closed set of edit operations and the phrases that name them.
//!
//! Everything the rest of the crate knows about "what commands exist" comes
//! from here:
//!
//! - [`Operation`]: the parsed, parameterized command value.
//! - [`OperationKind`]: the same set without parameters, used as a lookup key.
//! - [`phrases`]: canonical phrase, synonyms, and tolerant lookup per kind.
//! - [`params`]: clamped adjustment parameters.
//!
//! The catalog is pure data and logic; it depends on nothing else in the crate.

pub mod params;
pub mod phrases;

pub use params::{Brightness, Contrast, Hue, Saturation};
pub use phrases::{Candidate, CatalogEntry, Specificity, entry, lookup};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Multiplicative zoom factor for one implicit zoom step (25%).
pub const ZOOM_STEP: f32 = 1.25;

/// A single edit command. Immutable once built; adjustment parameters are
/// already clamped by their constructors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum Operation {
    // Filters
    Grayscale,
    Blur,
    Sharpen,
    EdgeDetection,
    Sepia,
    Invert,
    HistogramEqualization,
    AdaptiveThreshold,
    // Adjustments
    Brightness(Brightness),
    Contrast(Contrast),
    Saturation(Saturation),
    Hue(Hue),
    // Transforms
    RotateLeft,
    RotateRight,
    FlipHorizontal,
    FlipVertical,
    // View
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Fit,
    // Control
    Undo,
    Redo,
    Reset,
    Help,
    Exit,
}

/// Broad grouping that decides how the pipeline routes an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Filter,
    Adjustment,
    Transform,
    View,
    Control,
}

/// Parameterless mirror of [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Grayscale,
    Blur,
    Sharpen,
    EdgeDetection,
    Sepia,
    Invert,
    HistogramEqualization,
    AdaptiveThreshold,
    Brightness,
    Contrast,
    Saturation,
    Hue,
    RotateLeft,
    RotateRight,
    FlipHorizontal,
    FlipVertical,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Fit,
    Undo,
    Redo,
    Reset,
    Help,
    Exit,
}

impl OperationKind {
    pub fn all() -> &'static [OperationKind] {
        use OperationKind::*;
        &[
            Grayscale,
            Blur,
            Sharpen,
            EdgeDetection,
            Sepia,
            Invert,
            HistogramEqualization,
            AdaptiveThreshold,
            Brightness,
            Contrast,
            Saturation,
            Hue,
            RotateLeft,
            RotateRight,
            FlipHorizontal,
            FlipVertical,
            ZoomIn,
            ZoomOut,
            ResetZoom,
            Fit,
            Undo,
            Redo,
            Reset,
            Help,
            Exit,
        ]
    }

    pub fn family(self) -> Family {
        use OperationKind::*;
        match self {
            Grayscale | Blur | Sharpen | EdgeDetection | Sepia | Invert
            | HistogramEqualization | AdaptiveThreshold => Family::Filter,
            Brightness | Contrast | Saturation | Hue => Family::Adjustment,
            RotateLeft | RotateRight | FlipHorizontal | FlipVertical => Family::Transform,
            ZoomIn | ZoomOut | ResetZoom | Fit => Family::View,
            Undo | Redo | Reset | Help | Exit => Family::Control,
        }
    }

    /// Whether applying this kind produces a new image and a history entry.
    pub fn is_mutating(self) -> bool {
        matches!(
            self.family(),
            Family::Filter | Family::Adjustment | Family::Transform
        )
    }

    /// Human-readable name, e.g. `"edge detection"`.
    pub fn name(self) -> &'static str {
        phrases::entry(self).canonical
    }

    /// Build the operation for this kind using default parameters.
    ///
    /// Adjustments get their catalog default step; every other kind has no
    /// parameters and maps one-to-one.
    pub fn with_default_params(self) -> Operation {
        use OperationKind as K;
        match self {
            K::Grayscale => Operation::Grayscale,
            K::Blur => Operation::Blur,
            K::Sharpen => Operation::Sharpen,
            K::EdgeDetection => Operation::EdgeDetection,
            K::Sepia => Operation::Sepia,
            K::Invert => Operation::Invert,
            K::HistogramEqualization => Operation::HistogramEqualization,
            K::AdaptiveThreshold => Operation::AdaptiveThreshold,
            K::Brightness => Operation::Brightness(params::Brightness::default_step()),
            K::Contrast => Operation::Contrast(params::Contrast::default_step()),
            K::Saturation => Operation::Saturation(params::Saturation::default_step()),
            K::Hue => Operation::Hue(params::Hue::default_step()),
            K::RotateLeft => Operation::RotateLeft,
            K::RotateRight => Operation::RotateRight,
            K::FlipHorizontal => Operation::FlipHorizontal,
            K::FlipVertical => Operation::FlipVertical,
            K::ZoomIn => Operation::ZoomIn,
            K::ZoomOut => Operation::ZoomOut,
            K::ResetZoom => Operation::ResetZoom,
            K::Fit => Operation::Fit,
            K::Undo => Operation::Undo,
            K::Redo => Operation::Redo,
            K::Reset => Operation::Reset,
            K::Help => Operation::Help,
            K::Exit => Operation::Exit,
        }
    }

    /// Build an adjustment from an explicit number, clamping into range.
    /// Returns `None` for kinds that take no parameter.
    pub fn with_value(self, value: f32) -> Option<Operation> {
        use OperationKind as K;
        match self {
            K::Brightness => Some(Operation::Brightness(params::Brightness::new(value))),
            K::Contrast => Some(Operation::Contrast(params::Contrast::new(value))),
            K::Saturation => Some(Operation::Saturation(params::Saturation::new(value))),
            K::Hue => Some(Operation::Hue(params::Hue::new(value))),
            _ => None,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        use OperationKind as K;
        match self {
            Operation::Grayscale => K::Grayscale,
            Operation::Blur => K::Blur,
            Operation::Sharpen => K::Sharpen,
            Operation::EdgeDetection => K::EdgeDetection,
            Operation::Sepia => K::Sepia,
            Operation::Invert => K::Invert,
            Operation::HistogramEqualization => K::HistogramEqualization,
            Operation::AdaptiveThreshold => K::AdaptiveThreshold,
            Operation::Brightness(_) => K::Brightness,
            Operation::Contrast(_) => K::Contrast,
            Operation::Saturation(_) => K::Saturation,
            Operation::Hue(_) => K::Hue,
            Operation::RotateLeft => K::RotateLeft,
            Operation::RotateRight => K::RotateRight,
            Operation::FlipHorizontal => K::FlipHorizontal,
            Operation::FlipVertical => K::FlipVertical,
            Operation::ZoomIn => K::ZoomIn,
            Operation::ZoomOut => K::ZoomOut,
            Operation::ResetZoom => K::ResetZoom,
            Operation::Fit => K::Fit,
            Operation::Undo => K::Undo,
            Operation::Redo => K::Redo,
            Operation::Reset => K::Reset,
            Operation::Help => K::Help,
            Operation::Exit => K::Exit,
        }
    }

    pub fn family(&self) -> Family {
        self.kind().family()
    }

    pub fn is_mutating(&self) -> bool {
        self.kind().is_mutating()
    }

    /// The adjustment value, if this operation carries one.
    pub fn parameter(&self) -> Option<f32> {
        match self {
            Operation::Brightness(p) => Some(p.value()),
            Operation::Contrast(p) => Some(p.value()),
            Operation::Saturation(p) => Some(p.value()),
            Operation::Hue(p) => Some(p.value()),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parameter() {
            Some(v) => write!(f, "{} {v}", self.kind()),
            None => write!(f, "{}", self.kind()),
        }
    }
}
