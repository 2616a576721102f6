//! Image Placement
//!
//! Raster images are referenced, never decoded: an `ImageBitmap` is a URL
//! (or data URI) plus intrinsic size, and drawing one appends an `<image>`
//! element carrying the current transform. Source-rect cropping needs a
//! rasterizer, which this engine does not have; a host can plug one in
//! through the `ImageCropper` trait.

use silk_dom::ElementKind;

use crate::context::SvgRenderingContext2D;
use crate::{CanvasError, CanvasResult};

/// A drawable raster image reference
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBitmap {
    /// Intrinsic width in pixels
    pub width: u32,
    /// Intrinsic height in pixels
    pub height: u32,
    /// Href the output will reference (URL or data URI)
    pub href: String,
}

impl ImageBitmap {
    pub fn new(width: u32, height: u32, href: impl Into<String>) -> Self {
        Self {
            width,
            height,
            href: href.into(),
        }
    }
}

/// Host hook for source-rect cropping.
///
/// The expected implementation rasterizes the source rectangle and hands
/// back a new bitmap (typically a data URI), the way a scratch canvas
/// would.
pub trait ImageCropper {
    fn crop(
        &self,
        image: &ImageBitmap,
        sx: f64,
        sy: f64,
        sw: f64,
        sh: f64,
    ) -> Result<ImageBitmap, String>;
}

impl SvgRenderingContext2D {
    /// Draw an image at its intrinsic size
    pub fn draw_image(&mut self, image: &ImageBitmap, dx: f64, dy: f64) {
        self.draw_image_scaled(image, dx, dy, f64::from(image.width), f64::from(image.height));
    }

    /// Draw an image scaled into a destination rectangle
    pub fn draw_image_scaled(&mut self, image: &ImageBitmap, dx: f64, dy: f64, dw: f64, dh: f64) {
        self.place_image(image, dx, dy, dw, dh);
    }

    /// Draw a source rectangle of an image into a destination rectangle.
    ///
    /// Cropping is delegated to the configured `ImageCropper`. Without one
    /// the crop is skipped with a diagnostic and the whole image is drawn
    /// scaled into the destination instead.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image_cropped(
        &mut self,
        image: &ImageBitmap,
        sx: f64,
        sy: f64,
        sw: f64,
        sh: f64,
        dx: f64,
        dy: f64,
        dw: f64,
        dh: f64,
    ) -> CanvasResult<()> {
        let needs_crop = sx != 0.0
            || sy != 0.0
            || sw != f64::from(image.width)
            || sh != f64::from(image.height);
        if !needs_crop {
            self.place_image(image, dx, dy, dw, dh);
            return Ok(());
        }

        match self.cropper.take() {
            Some(cropper) => {
                let result = cropper.crop(image, sx, sy, sw, sh);
                self.cropper = Some(cropper);
                let cropped = result.map_err(CanvasError::Crop)?;
                self.place_image(&cropped, dx, dy, dw, dh);
                Ok(())
            }
            None => {
                tracing::warn!("no image cropper configured, drawing the full image");
                self.place_image(image, dx, dy, dw, dh);
                Ok(())
            }
        }
    }

    /// Draw the output of another drawing surface at an offset.
    ///
    /// The source's paint-server definitions are merged into this
    /// document's `<defs>` and its content group is copied in under the
    /// current transform translated by the offset.
    pub fn draw_image_context(&mut self, source: &SvgRenderingContext2D, dx: f64, dy: f64) {
        let src_doc = source.svg_document();

        for def in src_doc.tree().children(src_doc.defs()) {
            if let Some(id) = src_doc.tree().get_attr(def, "id") {
                self.register_id(&id.to_string());
            }
            match self.doc.tree_mut().import_subtree(src_doc.tree(), def) {
                Ok(copy) => {
                    let defs = self.doc.defs();
                    self.append_or_warn(defs, copy);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "definition could not be imported");
                }
            }
        }

        let copy = match self
            .doc
            .tree_mut()
            .import_subtree(src_doc.tree(), src_doc.content_group())
        {
            Ok(copy) => copy,
            Err(err) => {
                tracing::warn!(error = %err, "source content could not be imported");
                return;
            }
        };
        let transform = self.transform_matrix().translate(dx, dy);
        self.doc
            .tree_mut()
            .set_attr(copy, "transform", transform.to_svg_transform());
        let parent = self.drawing_parent();
        self.append_or_warn(parent, copy);
    }

    fn place_image(&mut self, image: &ImageBitmap, dx: f64, dy: f64, dw: f64, dh: f64) {
        let transform = self.transform_matrix().translate(dx, dy);
        let node = self.doc.tree_mut().create_element(ElementKind::Image);
        self.doc.tree_mut().set_attr(node, "width", format!("{dw}"));
        self.doc
            .tree_mut()
            .set_attr(node, "height", format!("{dh}"));
        self.doc
            .tree_mut()
            .set_attr(node, "preserveAspectRatio", "none".to_string());
        self.doc
            .tree_mut()
            .set_attr(node, "transform", transform.to_svg_transform());
        self.doc
            .tree_mut()
            .set_attr(node, "xlink:href", image.href.clone());
        let parent = self.drawing_parent();
        self.append_or_warn(parent, node);
    }
}
