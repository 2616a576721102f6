//! Text Emission
//!
//! Text goes out as `<text>` elements positioned in user space and carrying
//! the current transform; the engine never shapes glyphs. The font
//! shorthand is parsed into its SVG attribute parts, and measurement is a
//! host concern behind the `TextMeasurer` trait with a crude width
//! estimate as the fallback.

use silk_dom::ElementKind;

use crate::context::SvgRenderingContext2D;
use crate::style::{PaintKind, TextAlign, TextBaseline};

/// Parsed form of the CSS font shorthand
#[derive(Debug, Clone, PartialEq)]
pub struct FontStyle {
    pub style: String,
    pub weight: String,
    /// Size in px
    pub size: f64,
    pub family: String,
    /// Decoration keyword carried through to `text-decoration`
    pub decoration: Option<String>,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            style: "normal".to_string(),
            weight: "normal".to_string(),
            size: 10.0,
            family: "sans-serif".to_string(),
            decoration: None,
        }
    }
}

impl FontStyle {
    /// Parse a font shorthand like `"italic bold 12px Arial"`.
    ///
    /// Tokens before the size are classified by keyword; everything after
    /// it is the family. Unparsable input falls back to the defaults.
    pub fn parse(font: &str) -> Self {
        let mut parsed = Self::default();
        let mut tokens = font.split_whitespace();
        for token in tokens.by_ref() {
            if let Some(px) = token.strip_suffix("px") {
                if let Ok(size) = px.parse::<f64>() {
                    parsed.size = size;
                }
                break;
            }
            match token {
                "italic" | "oblique" => parsed.style = token.to_string(),
                "bold" | "bolder" | "lighter" => parsed.weight = token.to_string(),
                "underline" | "line-through" | "overline" => {
                    parsed.decoration = Some(token.to_string());
                }
                t if t
                    .parse::<u32>()
                    .is_ok_and(|w| (100..=900).contains(&w) && w % 100 == 0) =>
                {
                    parsed.weight = t.to_string();
                }
                _ => {}
            }
        }
        let family: Vec<&str> = tokens.collect();
        if !family.is_empty() {
            parsed.family = family.join(" ");
        }
        parsed
    }
}

/// Measured extents of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub width: f64,
    pub actual_bounding_box_left: f64,
    pub actual_bounding_box_right: f64,
    pub font_bounding_box_ascent: f64,
    pub font_bounding_box_descent: f64,
}

/// Host hook for real text measurement.
///
/// The engine has no font access, so precise metrics must come from
/// whoever does (a rasterizer, a font library, a browser).
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &FontStyle) -> TextMetrics;
}

/// Width estimate used when no measurer is configured: 0.8em per
/// character, ascent 0.8em, descent 0.2em
pub(crate) fn estimate_metrics(text: &str, font: &FontStyle) -> TextMetrics {
    let width = text.chars().count() as f64 * font.size * 0.8;
    TextMetrics {
        width,
        actual_bounding_box_left: 0.0,
        actual_bounding_box_right: width,
        font_bounding_box_ascent: font.size * 0.8,
        font_bounding_box_descent: font.size * 0.2,
    }
}

fn text_anchor(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Start | TextAlign::Left => "start",
        TextAlign::End | TextAlign::Right => "end",
        TextAlign::Center => "middle",
    }
}

fn dominant_baseline(baseline: TextBaseline) -> &'static str {
    match baseline {
        TextBaseline::Alphabetic | TextBaseline::Ideographic => "alphabetic",
        TextBaseline::Hanging => "hanging",
        TextBaseline::Top => "text-before-edge",
        TextBaseline::Bottom => "text-after-edge",
        TextBaseline::Middle => "central",
    }
}

impl SvgRenderingContext2D {
    /// Draw filled text at a position
    pub fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.emit_text(text, x, y, PaintKind::Fill);
    }

    /// Draw stroked text at a position
    pub fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        self.emit_text(text, x, y, PaintKind::Stroke);
    }

    /// Measure text under the current font, through the configured
    /// measurer or the built-in estimate
    pub fn measure_text(&self, text: &str) -> TextMetrics {
        let font = FontStyle::parse(&self.style.font);
        match &self.measurer {
            Some(measurer) => measurer.measure(text, &font),
            None => estimate_metrics(text, &font),
        }
    }

    fn emit_text(&mut self, text: &str, x: f64, y: f64, kind: PaintKind) {
        let font = FontStyle::parse(&self.style.font);
        let parent = self.drawing_parent();

        let node = self.new_shape_element(ElementKind::Text);
        self.doc
            .tree_mut()
            .set_attr(node, "font-family", font.family.clone());
        self.doc
            .tree_mut()
            .set_attr(node, "font-size", format!("{}px", font.size));
        self.doc
            .tree_mut()
            .set_attr(node, "font-style", font.style.clone());
        self.doc
            .tree_mut()
            .set_attr(node, "font-weight", font.weight.clone());
        if let Some(decoration) = &font.decoration {
            self.doc
                .tree_mut()
                .set_attr(node, "text-decoration", decoration.clone());
        }
        self.doc.tree_mut().set_attr(node, "x", format!("{x}"));
        self.doc.tree_mut().set_attr(node, "y", format!("{y}"));
        self.doc.tree_mut().set_attr(
            node,
            "text-anchor",
            text_anchor(self.style.text_align).to_string(),
        );
        self.doc.tree_mut().set_attr(
            node,
            "dominant-baseline",
            dominant_baseline(self.style.text_baseline).to_string(),
        );

        let content = self.doc.tree_mut().create_text(text);
        self.append_or_warn(node, content);

        self.current_element = node;
        let transform = self.transform_matrix().to_svg_transform();
        self.set_current_attr("transform", transform);
        self.apply_style(kind);

        // native canvas has no linking; an anchor href wraps the text when set
        if let Some(href) = self.font_href.clone() {
            let anchor = self.doc.tree_mut().create_element(ElementKind::Anchor);
            self.doc.tree_mut().set_attr(anchor, "xlink:href", href);
            self.append_or_warn(anchor, node);
            self.append_or_warn(parent, anchor);
        } else {
            self.append_or_warn(parent, node);
        }
    }
}
