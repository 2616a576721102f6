//! Gradients and Patterns
//!
//! Paint servers are plain values until a fill or stroke actually uses
//! them; at that point they are materialized into the document's `<defs>`
//! exactly once per id and referenced by `url(#id)`.

use silk_dom::{ElementKind, NodeId, SvgTree};

use crate::context::SvgRenderingContext2D;
use crate::image::ImageBitmap;
use crate::style::split_rgba;

/// Geometry of a gradient, in user-space units
#[derive(Debug, Clone, PartialEq)]
pub enum GradientKind {
    Linear {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    /// The focal point comes from the inner circle's center; the inner
    /// radius has no SVG counterpart and is dropped
    Radial {
        fx: f64,
        fy: f64,
        cx: f64,
        cy: f64,
        r: f64,
    },
}

/// One color stop
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: String,
    /// Split-out alpha, for rgba colors
    pub opacity: Option<String>,
}

/// A gradient paint source
#[derive(Debug, Clone)]
pub struct CanvasGradient {
    pub(crate) id: String,
    pub(crate) kind: GradientKind,
    pub(crate) stops: Vec<GradientStop>,
}

impl CanvasGradient {
    pub(crate) fn new(id: String, kind: GradientKind) -> Self {
        Self {
            id,
            kind,
            stops: Vec::new(),
        }
    }

    /// The id this gradient will carry in `<defs>`
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &GradientKind {
        &self.kind
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Append a color stop. An rgba color is split into its rgb part and a
    /// stop-opacity, for consumers that cannot handle alpha in the color.
    pub fn add_color_stop(&mut self, offset: f64, color: &str) {
        let stop = match split_rgba(color) {
            Some((rgb, alpha)) => GradientStop {
                offset,
                color: rgb,
                opacity: Some(format!("{alpha}")),
            },
            None => GradientStop {
                offset,
                color: color.to_string(),
                opacity: None,
            },
        };
        self.stops.push(stop);
    }
}

/// What a pattern tile contains
#[derive(Debug, Clone)]
pub enum PatternContent {
    /// A referenced raster image
    Image(ImageBitmap),
    /// A snapshot of another drawing surface's output
    Subtree { tree: SvgTree, root: NodeId },
}

/// A pattern paint source
#[derive(Debug, Clone)]
pub struct CanvasPattern {
    pub(crate) id: String,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) content: PatternContent,
}

impl CanvasPattern {
    /// The id this pattern will carry in `<defs>`
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl SvgRenderingContext2D {
    /// Ensure the gradient exists under `<defs>`, returning its id.
    /// Repeated applications of the same gradient reuse the first copy.
    pub(crate) fn materialize_gradient(&mut self, gradient: &CanvasGradient) -> String {
        if !self.register_id(&gradient.id) {
            return gradient.id.clone();
        }

        let kind = match gradient.kind {
            GradientKind::Linear { .. } => ElementKind::LinearGradient,
            GradientKind::Radial { .. } => ElementKind::RadialGradient,
        };
        let node = self.doc.tree_mut().create_element(kind);
        self.doc
            .tree_mut()
            .set_attr(node, "id", gradient.id.clone());
        match gradient.kind {
            GradientKind::Linear { x1, y1, x2, y2 } => {
                self.doc.tree_mut().set_attr(node, "x1", format!("{x1}px"));
                self.doc.tree_mut().set_attr(node, "y1", format!("{y1}px"));
                self.doc.tree_mut().set_attr(node, "x2", format!("{x2}px"));
                self.doc.tree_mut().set_attr(node, "y2", format!("{y2}px"));
            }
            GradientKind::Radial { fx, fy, cx, cy, r } => {
                self.doc.tree_mut().set_attr(node, "cx", format!("{cx}px"));
                self.doc.tree_mut().set_attr(node, "cy", format!("{cy}px"));
                self.doc.tree_mut().set_attr(node, "r", format!("{r}px"));
                self.doc.tree_mut().set_attr(node, "fx", format!("{fx}px"));
                self.doc.tree_mut().set_attr(node, "fy", format!("{fy}px"));
            }
        }
        self.doc
            .tree_mut()
            .set_attr(node, "gradientUnits", "userSpaceOnUse".to_string());

        for stop in &gradient.stops {
            let stop_node = self.doc.tree_mut().create_element(ElementKind::Stop);
            self.doc
                .tree_mut()
                .set_attr(stop_node, "offset", format!("{}", stop.offset));
            self.doc
                .tree_mut()
                .set_attr(stop_node, "stop-color", stop.color.clone());
            if let Some(opacity) = &stop.opacity {
                self.doc
                    .tree_mut()
                    .set_attr(stop_node, "stop-opacity", opacity.clone());
            }
            self.append_or_warn(node, stop_node);
        }

        let defs = self.doc.defs();
        self.append_or_warn(defs, node);
        gradient.id.clone()
    }

    /// Ensure the pattern exists under `<defs>`, returning its id
    pub(crate) fn materialize_pattern(&mut self, pattern: &CanvasPattern) -> String {
        if !self.register_id(&pattern.id) {
            return pattern.id.clone();
        }

        let node = self.doc.tree_mut().create_element(ElementKind::Pattern);
        self.doc.tree_mut().set_attr(node, "id", pattern.id.clone());
        self.doc
            .tree_mut()
            .set_attr(node, "width", format!("{}", pattern.width));
        self.doc
            .tree_mut()
            .set_attr(node, "height", format!("{}", pattern.height));
        self.doc
            .tree_mut()
            .set_attr(node, "patternUnits", "userSpaceOnUse".to_string());

        match &pattern.content {
            PatternContent::Image(image) => {
                let img = self.doc.tree_mut().create_element(ElementKind::Image);
                self.doc
                    .tree_mut()
                    .set_attr(img, "width", format!("{}", image.width));
                self.doc
                    .tree_mut()
                    .set_attr(img, "height", format!("{}", image.height));
                self.doc
                    .tree_mut()
                    .set_attr(img, "xlink:href", image.href.clone());
                self.append_or_warn(node, img);
            }
            PatternContent::Subtree { tree, root } => {
                match self.doc.tree_mut().import_subtree(tree, *root) {
                    Ok(copy) => self.append_or_warn(node, copy),
                    Err(err) => {
                        tracing::warn!(error = %err, "pattern content could not be imported");
                    }
                }
            }
        }

        let defs = self.doc.defs();
        self.append_or_warn(defs, node);
        pattern.id.clone()
    }
}
