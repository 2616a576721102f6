//! silk-canvas - Canvas 2D context emulation over a retained SVG tree
//!
//! Implements the immediate-mode 2D drawing surface (paths, transforms,
//! styles, gradients, text, images) but instead of rasterizing pixels it
//! appends styled nodes to a `silk-dom` document. Callers drive the usual
//! imperative API and read back a vector document that renders the same.

mod context;
mod gradient;
mod image;
mod matrix;
mod path;
mod style;
mod text;

pub use context::SvgRenderingContext2D;
pub use gradient::{CanvasGradient, CanvasPattern, GradientKind, GradientStop, PatternContent};
pub use image::{ImageBitmap, ImageCropper};
pub use matrix::Matrix;
pub use path::{Path2D, PathCommand};
pub use style::{
    LineCap, LineJoin, Paint, PaintKind, PatternRepetition, StyleState, TextAlign, TextBaseline,
};
pub use text::{FontStyle, TextMeasurer, TextMetrics};

/// Result type for drawing operations that can fail hard
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Drawing errors - only invalid arguments fail hard.
///
/// Structural inconsistencies and unsupported features are reported through
/// `tracing` and the call sequence continues, matching the leniency of the
/// emulated API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CanvasError {
    /// Negative radius or similar out-of-range argument
    #[error("IndexSizeError: the radius provided ({0}) is negative")]
    IndexSize(f64),
    /// An image crop delegated to the host rasterizer failed
    #[error("image crop failed: {0}")]
    Crop(String),
}
