//! Style State and Resolution
//!
//! The full drawing style is plain data on the context, snapshotted by
//! save/restore. Styles reach the document only when a paint verb runs:
//! `apply_style` diffs the state against SVG presentation defaults and
//! writes attributes onto the current element, so untouched styles add no
//! markup.

use crate::context::SvgRenderingContext2D;
use crate::gradient::{CanvasGradient, CanvasPattern};

/// Which paint a verb applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintKind {
    Fill,
    Stroke,
}

impl PaintKind {
    pub fn attr_name(self) -> &'static str {
        match self {
            PaintKind::Fill => "fill",
            PaintKind::Stroke => "stroke",
        }
    }
}

/// A fill or stroke paint source
#[derive(Debug, Clone)]
pub enum Paint {
    /// CSS color string, stored verbatim
    Color(String),
    Gradient(CanvasGradient),
    Pattern(CanvasPattern),
}

/// Line cap shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn as_str(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

/// Line join shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    pub fn as_str(self) -> &'static str {
        match self {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }
}

/// Horizontal text anchoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Left,
    Right,
    Center,
}

/// Vertical text anchoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    #[default]
    Alphabetic,
    Top,
    Hanging,
    Middle,
    Ideographic,
    Bottom,
}

/// Pattern tiling mode. Accepted for API compatibility; tiles always
/// repeat in both directions in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternRepetition {
    #[default]
    Repeat,
    RepeatX,
    RepeatY,
    NoRepeat,
}

/// The complete mutable drawing state
#[derive(Debug, Clone)]
pub struct StyleState {
    pub stroke_style: Paint,
    pub fill_style: Paint,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    pub global_alpha: f64,
    /// Pre-joined dash list, `None` when solid
    pub line_dash: Option<String>,
    pub line_dash_offset: f64,
    /// Font shorthand, parsed lazily when text is drawn
    pub font: String,
    pub text_align: TextAlign,
    pub text_baseline: TextBaseline,
    /// Shadow properties are part of the state for API compatibility but
    /// have no SVG counterpart and are never emitted
    pub shadow_color: String,
    pub shadow_blur: f64,
    pub shadow_offset_x: f64,
    pub shadow_offset_y: f64,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            stroke_style: Paint::Color("#000000".to_string()),
            fill_style: Paint::Color("#000000".to_string()),
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            global_alpha: 1.0,
            line_dash: None,
            line_dash_offset: 0.0,
            font: "10px sans-serif".to_string(),
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
            shadow_color: "#000000".to_string(),
            shadow_blur: 0.0,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
        }
    }
}

impl SvgRenderingContext2D {
    /// Write the current style onto the current element as attributes.
    ///
    /// Plain values are only written when they differ from the SVG
    /// presentation default, which is not always the context default:
    /// the context starts with miter limit 10 while SVG assumes 4, so a
    /// default stroke still writes `stroke-miterlimit="10"`. Gradient and
    /// pattern paints are materialized into `<defs>` and referenced from
    /// their own attribute no matter which verb ran.
    pub(crate) fn apply_style(&mut self, kind: PaintKind) {
        for slot in [PaintKind::Fill, PaintKind::Stroke] {
            let paint = match slot {
                PaintKind::Fill => self.style.fill_style.clone(),
                PaintKind::Stroke => self.style.stroke_style.clone(),
            };
            match paint {
                Paint::Gradient(gradient) => {
                    let id = self.materialize_gradient(&gradient);
                    self.set_current_attr(slot.attr_name(), format!("url(#{id})"));
                }
                Paint::Pattern(pattern) => {
                    let id = self.materialize_pattern(&pattern);
                    self.set_current_attr(slot.attr_name(), format!("url(#{id})"));
                }
                Paint::Color(color) if slot == kind => {
                    // "none" is already what SVG assumes for stroke
                    if slot == PaintKind::Stroke && color == "none" {
                        continue;
                    }
                    if let Some((rgb, alpha)) = split_rgba(&color) {
                        let opacity = alpha * self.style.global_alpha;
                        self.set_current_attr(slot.attr_name(), rgb);
                        self.set_current_attr(
                            &format!("{}-opacity", slot.attr_name()),
                            format!("{opacity}"),
                        );
                    } else {
                        self.set_current_attr(slot.attr_name(), color);
                    }
                }
                Paint::Color(_) => {}
            }
        }

        if kind == PaintKind::Stroke {
            let style = self.style.clone();
            if style.line_cap != LineCap::Butt {
                self.set_current_attr("stroke-linecap", style.line_cap.as_str().to_string());
            }
            if style.line_join != LineJoin::Miter {
                self.set_current_attr("stroke-linejoin", style.line_join.as_str().to_string());
            }
            if style.miter_limit != 4.0 {
                self.set_current_attr("stroke-miterlimit", format!("{}", style.miter_limit));
            }
            // widths are written in device terms; the comparison against the
            // SVG default happens after scaling so a transform alone is
            // enough to make the width explicit
            let (scale_x, scale_y) = self.transform_matrix().scale_components();
            let scaled_width = style.line_width * scale_x.max(scale_y);
            if scaled_width != 1.0 {
                self.set_current_attr("stroke-width", format!("{scaled_width}"));
            }
            if let Some(dash) = &style.line_dash {
                self.set_current_attr("stroke-dasharray", dash.clone());
            }
        }

        if self.style.global_alpha != 1.0 {
            let attr = format!("{}-opacity", kind.attr_name());
            // an rgba paint has already folded the global alpha in
            if self.current_attr(&attr).is_none() {
                let alpha = self.style.global_alpha;
                self.set_current_attr(&attr, format!("{alpha}"));
            }
        }
    }
}

/// Split an `rgba(r, g, b, a)` color into an `rgb(...)` string and its
/// alpha, for consumers that cannot handle alpha in the color itself.
/// Returns `None` for anything that is not a well-formed rgba value.
pub(crate) fn split_rgba(value: &str) -> Option<(String, f64)> {
    let start = value.find("rgba(")?;
    let rest = &value[start + 5..];
    let end = rest.find(')')?;
    let parts: Vec<&str> = rest[..end].split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return None;
    }
    for channel in &parts[..3] {
        channel.parse::<f64>().ok()?;
    }
    let alpha = parts[3].parse::<f64>().ok()?;
    Some((
        format!("rgb({},{},{})", parts[0], parts[1], parts[2]),
        alpha,
    ))
}
